//! Template discovery and layout composition.
//!
//! The template root is walked once at startup. Every `.html` file outside
//! `layouts/` becomes a renderable view named by its path relative to the
//! root (`admin/users/index.html`). Views under `admin/` are wrapped in
//! `layouts/admin.html`, views under `public/` in `layouts/public.html`;
//! anything else renders bare and is mainly useful for includes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tera::{Context, Tera};
use tracing::info;

use crate::error::ConsoleError;

pub const LAYOUTS_DIR: &str = "layouts";
pub const ADMIN_LAYOUT: &str = "layouts/admin.html";
pub const PUBLIC_LAYOUT: &str = "layouts/public.html";

/// Layout a view is composed into, chosen by its top-level namespace.
pub fn layout_for(name: &str) -> Option<&'static str> {
    if name.starts_with("admin/") {
        Some(ADMIN_LAYOUT)
    } else if name.starts_with("public/") {
        Some(PUBLIC_LAYOUT)
    } else {
        None
    }
}

pub struct Templates {
    tera: Tera,
    compositions: HashMap<String, Vec<String>>,
}

impl Templates {
    /// Parse everything under `root`. Any unreadable file, syntax error or
    /// missing layout fails the whole load.
    pub fn load(root: &Path) -> Result<Self, ConsoleError> {
        if !root.is_dir() {
            return Err(ConsoleError::TemplateLoad(format!(
                "template directory {} not found",
                root.display()
            )));
        }

        let mut files = Vec::new();
        collect_html(root, root, &mut files)?;
        files.sort();

        let mut sources = Vec::with_capacity(files.len());
        let mut compositions = HashMap::new();

        for (name, path) in files {
            let body = fs::read_to_string(&path)?;

            if name.starts_with(&format!("{LAYOUTS_DIR}/")) {
                sources.push((name, body));
                continue;
            }

            let layout = layout_for(&name);
            let source = match layout {
                Some(layout) => format!("{{% extends \"{layout}\" %}}\n{body}"),
                None => body,
            };
            let chain: Vec<String> = layout
                .into_iter()
                .map(str::to_string)
                .chain(std::iter::once(name.clone()))
                .collect();

            compositions.insert(name.clone(), chain);
            sources.push((name, source));
        }

        let mut tera = Tera::default();
        tera.add_raw_templates(sources)?;

        info!(
            path = %root.display(),
            views = compositions.len(),
            "templates loaded"
        );

        Ok(Self { tera, compositions })
    }

    /// Fragments making up `name`, outermost layout first.
    pub fn composition(&self, name: &str) -> Option<&[String]> {
        self.compositions.get(name).map(Vec::as_slice)
    }

    pub fn render(&self, name: &str, ctx: &Context) -> Result<String, ConsoleError> {
        if !self.compositions.contains_key(name) {
            return Err(ConsoleError::TemplateLoad(format!("unknown view {name}")));
        }
        Ok(self.tera.render(name, ctx)?)
    }
}

fn collect_html(
    root: &Path,
    dir: &Path,
    out: &mut Vec<(String, PathBuf)>,
) -> Result<(), ConsoleError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_html(root, &path, out)?;
            continue;
        }
        if !is_html_file(&path) {
            continue;
        }
        let rel = path.strip_prefix(root).map_err(|e| {
            ConsoleError::TemplateLoad(format!("{}: {e}", path.display()))
        })?;
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        out.push((name, path));
    }
    Ok(())
}

fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("html"))
        == Some(true)
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut dir = std::env::temp_dir();
        dir.push(format!("console-templates-{tag}-{}-{nanos}", std::process::id()));
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, body).expect("write template");
    }

    fn layout(tag: &str) -> String {
        format!("<{tag}>{{% block content %}}{{% endblock content %}}</{tag}>")
    }

    #[test]
    fn namespaces_pick_layouts() {
        assert_eq!(layout_for("admin/users/index.html"), Some(ADMIN_LAYOUT));
        assert_eq!(layout_for("public/page.html"), Some(PUBLIC_LAYOUT));
        assert_eq!(layout_for("partials/errors.html"), None);
        assert_eq!(layout_for("administrator.html"), None);
    }

    #[test]
    fn compositions_and_rendering() {
        let root = scratch_dir("compose");
        write(&root, ADMIN_LAYOUT, &layout("admin"));
        write(&root, PUBLIC_LAYOUT, &layout("public"));
        write(
            &root,
            "admin/users/index.html",
            "{% block content %}users {{ n }}{% endblock content %}",
        );
        write(&root, "public/page.html", "{% block content %}page{% endblock content %}");
        write(&root, "bare.html", "just {{ n }}");
        write(&root, "notes.txt", "ignored");

        let templates = Templates::load(&root).expect("load");

        assert_eq!(
            templates.composition("admin/users/index.html"),
            Some(&[ADMIN_LAYOUT.to_string(), "admin/users/index.html".to_string()][..])
        );
        assert_eq!(
            templates.composition("bare.html"),
            Some(&["bare.html".to_string()][..])
        );
        assert!(templates.composition(ADMIN_LAYOUT).is_none());
        assert!(templates.composition("notes.txt").is_none());

        let mut ctx = Context::new();
        ctx.insert("n", &3);
        assert_eq!(
            templates.render("admin/users/index.html", &ctx).expect("render"),
            "<admin>users 3</admin>"
        );
        assert_eq!(
            templates.render("public/page.html", &ctx).expect("render"),
            "<public>page</public>"
        );
        assert_eq!(templates.render("bare.html", &ctx).expect("render"), "just 3");
        assert!(templates.render("missing.html", &ctx).is_err());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn syntax_error_fails_load() {
        let root = scratch_dir("broken");
        write(&root, PUBLIC_LAYOUT, &layout("public"));
        write(&root, "public/broken.html", "{% block content %}{{ oops {% endblock content %}");

        assert!(Templates::load(&root).is_err());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_layout_fails_load() {
        let root = scratch_dir("nolayout");
        write(&root, "admin/error.html", "{% block content %}x{% endblock content %}");

        assert!(Templates::load(&root).is_err());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn missing_root_fails_load() {
        let root = std::env::temp_dir().join("console-templates-does-not-exist");
        assert!(matches!(
            Templates::load(&root),
            Err(ConsoleError::TemplateLoad(_))
        ));
    }

    #[test]
    fn bundled_templates_load() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        let templates = Templates::load(&root).expect("bundled templates parse");
        for view in [
            "admin/users/index.html",
            "admin/pages/edit.html",
            "public/login.html",
            "public/tools.html",
        ] {
            assert!(templates.composition(view).is_some(), "{view} missing");
        }
    }
}
