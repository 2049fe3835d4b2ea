//! Manifest rendering
//!
//! Templates use Jinja2 syntax through `tera`. Template files in the project
//! folder are known by their path relative to the project root
//! (`.ci3/namespace.yaml`, `.ci3/services/web.yaml`...) so templates can
//! `{% include %}` each other by that path. Only the rendered template and
//! the templates it references are read and parsed.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tera::{Context, Tera};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Ci3Error, Result};
use crate::project::{PROJECT_DIR, is_yaml};
use crate::vars::VarMap;

/// Project subfolders that never hold templates
const SKIPPED_DIRS: [&str; 2] = ["vars", "secrets"];

/// Tags naming another template
const REFERENCE_TAGS: [&str; 3] = ["include", "extends", "import"];

/// Renders `template` with `vars`
///
/// A relative `template` is resolved against `root`, the directory holding
/// the project folder.
pub fn render(root: &Path, template: &Path, vars: &VarMap) -> Result<String> {
    let path = if template.is_absolute() {
        template.to_path_buf()
    } else {
        root.join(template)
    };
    if !path.is_file() {
        return Err(Ci3Error::missing_file(path));
    }

    let render_error = |e: &dyn StdError| Ci3Error::Render {
        path: path.clone(),
        message: error_chain(e),
    };

    let available = project_templates(root).map_err(|e| render_error(&e))?;
    let name = template_name(root, &path);
    let source = fs::read_to_string(&path).map_err(|e| render_error(&e))?;
    let sources =
        collect_sources(name.clone(), source, &available).map_err(|e| render_error(&e))?;
    debug!("Rendering {} with {} template(s)", name, sources.len());

    let mut tera = Tera::default();
    tera.autoescape_on(Vec::new());
    tera.add_raw_templates(sources.into_iter().collect::<Vec<_>>())
        .map_err(|e| render_error(&e))?;

    let context = Context::from_serialize(vars).map_err(|e| render_error(&e))?;
    tera.render(&name, &context).map_err(|e| render_error(&e))
}

/// Name a template is registered under: its `/`-joined path relative to `root`
fn template_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if relative.is_absolute() {
        format!("/{}", parts.join("/"))
    } else {
        parts.join("/")
    }
}

/// Template files of the project folder, by registered name
fn project_templates(root: &Path) -> io::Result<BTreeMap<String, PathBuf>> {
    let project = root.join(PROJECT_DIR);
    let mut templates = BTreeMap::new();
    if !project.is_dir() {
        return Ok(templates);
    }

    let walker = WalkDir::new(&project).min_depth(1).into_iter().filter_entry(|e| {
        !(e.depth() == 1
            && e.file_type().is_dir()
            && SKIPPED_DIRS.iter().any(|d| e.file_name() == *d))
    });

    for entry in walker {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() || !is_template(entry.path()) {
            continue;
        }
        let path = entry.into_path();
        templates.insert(template_name(root, &path), path);
    }

    Ok(templates)
}

/// Reads the entry template's references, transitively
///
/// Names missing from `available` are left for tera to report when it
/// actually needs them.
fn collect_sources(
    name: String,
    source: String,
    available: &BTreeMap<String, PathBuf>,
) -> io::Result<BTreeMap<String, String>> {
    let mut sources = BTreeMap::new();
    let mut pending = vec![(name, source)];

    while let Some((name, source)) = pending.pop() {
        for referenced in referenced_templates(&source) {
            if referenced == name
                || sources.contains_key(&referenced)
                || pending.iter().any(|(n, _)| *n == referenced)
            {
                continue;
            }
            match available.get(&referenced) {
                Some(path) => {
                    let text = fs::read_to_string(path)?;
                    pending.push((referenced, text));
                }
                None => debug!("{} references unknown template {}", name, referenced),
            }
        }
        sources.insert(name, source);
    }

    Ok(sources)
}

/// Names quoted in the `include`, `extends` and `import` tags of `source`
fn referenced_templates(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for tag in source.split("{%").skip(1) {
        let body = tag.split("%}").next().unwrap_or_default();
        let body = body.trim_start_matches('-').trim_start();
        let keyword = body.split_whitespace().next().unwrap_or_default();
        if REFERENCE_TAGS.contains(&keyword) {
            names.extend(quoted_strings(&body[keyword.len()..]));
        }
    }
    names
}

fn quoted_strings(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if matches!(c, '"' | '\'' | '`') {
            found.push(chars.by_ref().take_while(|&q| q != c).collect());
        }
    }
    found
}

fn is_template(path: &Path) -> bool {
    is_yaml(path) || path.extension().is_some_and(|x| x == "j2")
}

fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectFolder;
    use serde_json::json;

    fn vars() -> VarMap {
        json!({
            "cluster": {"name": "minikube", "namespace": "foo-bar"},
            "containers": {"homepage": {"image": {"name": "homepage", "tag": "latest"}}},
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_render_substitutes_vars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pod.yaml");
        fs::write(&path, "namespace: {{ cluster.namespace }}\n").unwrap();

        let out = render(dir.path(), Path::new("pod.yaml"), &vars()).unwrap();
        assert_eq!(out.trim_end(), "namespace: foo-bar");
    }

    #[test]
    fn test_render_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let err = render(dir.path(), Path::new("nope.yaml"), &vars()).unwrap_err();
        match err {
            Ci3Error::MissingFile { path } => assert!(path.ends_with("nope.yaml")),
            other => panic!("Expected MissingFile, got {:?}", other),
        }
    }

    #[test]
    fn test_render_scaffold_deploy_with_includes() {
        let dir = tempfile::tempdir().unwrap();
        let project = ProjectFolder::new(dir.path());
        project.scaffold().unwrap();

        let out = render(dir.path(), &project.deploy_path(), &vars()).unwrap();
        assert!(out.contains("kind: Namespace"));
        assert!(out.contains("name: foo-bar"));
        assert!(out.contains("image: homepage:latest"));
    }

    #[test]
    fn test_render_does_not_escape() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cfg.yaml"), "value: \"{{ v }}\"\n").unwrap();
        let vars = json!({"v": "<a & b>"}).as_object().cloned().unwrap();

        let out = render(dir.path(), Path::new("cfg.yaml"), &vars).unwrap();
        assert_eq!(out.trim_end(), "value: \"<a & b>\"");
    }

    #[test]
    fn test_render_undefined_variable_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.yaml"), "x: {{ missing.value }}\n").unwrap();

        let err = render(dir.path(), Path::new("bad.yaml"), &vars()).unwrap_err();
        assert!(matches!(err, Ci3Error::Render { .. }));
    }

    #[test]
    fn test_render_ignores_unreferenced_broken_template() {
        let dir = tempfile::tempdir().unwrap();
        let project = ProjectFolder::new(dir.path());
        project.scaffold().unwrap();
        fs::write(
            project.services_path().join("helm.yaml"),
            "image: {{ .Values.image }}\n",
        )
        .unwrap();
        fs::write(project.services_path().join("blob.yaml"), b"\xff\xfe\x00").unwrap();

        let out = render(dir.path(), &project.namespace_path(), &vars()).unwrap();
        assert!(out.contains("name: foo-bar"));
    }

    #[test]
    fn test_render_reports_broken_included_template() {
        let dir = tempfile::tempdir().unwrap();
        let project = ProjectFolder::new(dir.path());
        project.scaffold().unwrap();
        fs::write(
            project.services_path().join("web_service.yaml"),
            "image: {{ .Values.image }}\n",
        )
        .unwrap();

        let err = render(dir.path(), &project.deploy_path(), &vars()).unwrap_err();
        match err {
            Ci3Error::Render { message, .. } => assert!(message.contains("web_service.yaml")),
            other => panic!("Expected Render, got {:?}", other),
        }
    }

    #[test]
    fn test_referenced_templates() {
        let source = "{% include \".ci3/a.yaml\" %}\n\
                      {%- include ['.ci3/b.yaml', \".ci3/c.yaml\"] ignore missing -%}\n\
                      {% import \"macros.j2\" as m %}{% if x %}\"no\"{% endif %}";
        assert_eq!(
            referenced_templates(source),
            vec![".ci3/a.yaml", ".ci3/b.yaml", ".ci3/c.yaml", "macros.j2"]
        );
    }

    #[test]
    fn test_template_name() {
        assert_eq!(
            template_name(Path::new("/work"), Path::new("/work/.ci3/namespace.yaml")),
            ".ci3/namespace.yaml"
        );
        assert_eq!(
            template_name(Path::new("."), Path::new("./.ci3/deploy.yaml")),
            ".ci3/deploy.yaml"
        );
    }
}
