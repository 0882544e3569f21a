use anyhow::{anyhow, Result};
use handlebars::{handlebars_helper, Handlebars};
use include_dir::{include_dir, Dir};
use serde_json::Value;

static TEMPLATES: Dir = include_dir!("templates");

/// Registry with every page template. Files starting with `_` are partials
/// and register under the name without the underscore.
pub fn get_handlebars() -> Result<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();

    handlebars_helper!(exists: |v: Value| {
        match v {
            serde_json::Value::Null => false,
            serde_json::Value::String(s) => !s.trim().is_empty(),
            _ => true,
        }
    });
    handlebars.register_helper("exists", Box::new(exists));

    handlebars_helper!(stringeq: |s1: String, s2: String| s1.eq(&s2));
    handlebars.register_helper("stringeq", Box::new(stringeq));

    handlebars_helper!(inc: |n: u64| n + 1);
    handlebars.register_helper("inc", Box::new(inc));

    for file in TEMPLATES.files() {
        let path = file.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("hbs") {
            continue;
        }
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| anyhow!("Invalid template name: {}", path.display()))?;
        let source = file
            .contents_utf8()
            .ok_or_else(|| anyhow!("Template {} is not UTF-8", path.display()))?;

        handlebars.register_template_string(stem.trim_start_matches('_'), source)?;
    }

    Ok(handlebars)
}
