use std::{fmt, io::Write};

use maud::{html, Markup, DOCTYPE};

use crate::{
    data::{template_context, Provider},
    Status,
};

/// The name of the generic template used when there is no template for a specific status code.
pub const GENERIC_TEMPLATE: &str = "error";

/// A collection of named templates.
///
/// Templates are looked up by the decimal status code (`"404"`), then by [GENERIC_TEMPLATE].
pub trait TemplateSet {
    fn has_template(&self, name: &str) -> bool;

    fn render_to(
        &self,
        name: &str,
        context: &tera::Context,
        out: &mut dyn Write,
    ) -> Result<(), tera::Error>;
}

impl TemplateSet for tera::Tera {
    fn has_template(&self, name: &str) -> bool {
        self.get_template_names().any(|n| n == name)
    }

    fn render_to(
        &self,
        name: &str,
        context: &tera::Context,
        out: &mut dyn Write,
    ) -> Result<(), tera::Error> {
        tera::Tera::render_to(self, name, context, out)
    }
}

/// The template chosen to render a page.
pub enum Template<'t> {
    Named {
        templates: &'t dyn TemplateSet,
        name: String,
    },
    /// The built-in placeholder page
    Default,
}

impl<'t> Template<'t> {
    pub fn name(&self) -> &str {
        match self {
            Template::Named { name, .. } => name,
            Template::Default => "<default>",
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Template::Default)
    }

    /// Render the template into `out`. On error, `out` may contain partial output.
    pub fn render(&self, data: &dyn Provider, out: &mut Vec<u8>) -> Result<(), tera::Error> {
        match self {
            Template::Named { templates, name } => {
                let context = template_context(data);
                templates.render_to(name, &context, out)
            }
            Template::Default => {
                out.extend_from_slice(default_page(data).into_string().as_bytes());
                Ok(())
            }
        }
    }
}

impl<'t> fmt::Debug for Template<'t> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Template").field(&self.name()).finish()
    }
}

/// Choose the template for a status code: the code-specific template, then the generic
/// template, then the built-in default page.
pub fn select(templates: Option<&dyn TemplateSet>, status: Status) -> Template<'_> {
    let Some(templates) = templates else {
        return Template::Default;
    };

    let code = status.code_string();
    if templates.has_template(&code) {
        return Template::Named {
            templates,
            name: code,
        };
    }

    if templates.has_template(GENERIC_TEMPLATE) {
        return Template::Named {
            templates,
            name: GENERIC_TEMPLATE.to_string(),
        };
    }

    Template::Default
}

/// The placeholder page used when no template matches.
pub fn default_page(data: &dyn Provider) -> Markup {
    let status = data.status();
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (data.summary()) }
            }
            body {
                h1 { (status.as_u16()) " " (status.text()) }
                p { (data.message()) }
            }
        }
    }
}
