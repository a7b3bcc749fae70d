use crate::decompose::naming::applet_file_name;
use crate::dom::{DomNode, ElementNode};
use crate::manifest::Role;
use serde::Serialize;

/// Siebel applet shell a fragment body is wrapped in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AppletWrapper {
    /// Header plus rows sections
    List,
    /// Single body section
    Form,
    Toolbar,
    /// Body passed through unchanged
    Generic,
}

impl AppletWrapper {
    /// Wrapper for a role; roles without a dedicated wrapper fall back to `Generic`
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::List | Role::Navigation | Role::Grid => AppletWrapper::List,
            Role::Form | Role::Main | Role::Content | Role::Banner | Role::Region => AppletWrapper::Form,
            Role::Button | Role::Toolbar | Role::Action => AppletWrapper::Toolbar,
            Role::Generic => AppletWrapper::Generic,
        }
    }

    /// Value of the applet's `type` attribute
    pub fn applet_type(&self) -> &'static str {
        match self {
            AppletWrapper::List => "List",
            AppletWrapper::Form => "Form",
            AppletWrapper::Toolbar => "Toolbar",
            AppletWrapper::Generic => "Generic",
        }
    }

    /// Render the applet template around `body`
    pub fn render(&self, safe_name: &str, body: &str) -> String {
        let open = format!(
            "<siebel:Applet name=\"{}\" type=\"{}\">",
            safe_name,
            self.applet_type()
        );
        match self {
            AppletWrapper::List => format!(
                "{open}\n  <siebel:ListHeader/>\n  <siebel:ListRows>\n    {body}\n  </siebel:ListRows>\n</siebel:Applet>\n"
            ),
            AppletWrapper::Form => format!(
                "{open}\n  <siebel:FormBody>\n    {body}\n  </siebel:FormBody>\n</siebel:Applet>\n"
            ),
            AppletWrapper::Toolbar => format!(
                "{open}\n  <siebel:ToolbarBody>\n    {body}\n  </siebel:ToolbarBody>\n</siebel:Applet>\n"
            ),
            AppletWrapper::Generic => format!("{open}\n  {body}\n</siebel:Applet>\n"),
        }
    }
}

/// Placeholder left in the shell where an applet's content used to be
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeMarker {
    /// Normalized applet name
    pub name: String,
    /// Applet file the marker points at
    pub file: String,
}

impl IncludeMarker {
    pub const TAG: &'static str = "siebel:IncludeApplet";

    pub fn new(normalized_name: &str) -> Self {
        Self {
            name: normalized_name.to_string(),
            file: applet_file_name(normalized_name),
        }
    }

    /// Comment form, used by the flat pipeline
    pub fn to_comment(&self) -> DomNode {
        DomNode::Comment(format!(
            " {} name='{}' file='{}' ",
            Self::TAG,
            self.name,
            self.file
        ))
    }

    /// Element form, used by the hierarchical pipeline
    pub fn to_element(&self) -> ElementNode {
        ElementNode::new(Self::TAG)
            .with_attribute("name", self.name.as_str())
            .with_attribute("file", self.file.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_table() {
        for role in [Role::List, Role::Navigation, Role::Grid] {
            assert_eq!(AppletWrapper::for_role(role), AppletWrapper::List);
        }
        for role in [Role::Form, Role::Main, Role::Content, Role::Banner, Role::Region] {
            assert_eq!(AppletWrapper::for_role(role), AppletWrapper::Form);
        }
        for role in [Role::Button, Role::Toolbar, Role::Action] {
            assert_eq!(AppletWrapper::for_role(role), AppletWrapper::Toolbar);
        }
        assert_eq!(AppletWrapper::for_role(Role::parse("sidebar")), AppletWrapper::Generic);
    }

    #[test]
    fn test_list_template() {
        let rendered = AppletWrapper::List.render("accounts", "<tr><td>1</td></tr>");
        assert_eq!(
            rendered,
            concat!(
                "<siebel:Applet name=\"accounts\" type=\"List\">\n",
                "  <siebel:ListHeader/>\n",
                "  <siebel:ListRows>\n",
                "    <tr><td>1</td></tr>\n",
                "  </siebel:ListRows>\n",
                "</siebel:Applet>\n"
            )
        );
    }

    #[test]
    fn test_form_and_toolbar_templates() {
        let form = AppletWrapper::Form.render("detail", "<input>");
        assert!(form.starts_with("<siebel:Applet name=\"detail\" type=\"Form\">\n  <siebel:FormBody>\n"));
        assert!(form.contains("    <input>\n  </siebel:FormBody>"));

        let toolbar = AppletWrapper::Toolbar.render("actions", "<button>Go</button>");
        assert!(toolbar.contains("<siebel:ToolbarBody>\n    <button>Go</button>\n  </siebel:ToolbarBody>"));
    }

    #[test]
    fn test_generic_template() {
        assert_eq!(
            AppletWrapper::Generic.render("nav", "X"),
            "<siebel:Applet name=\"nav\" type=\"Generic\">\n  X\n</siebel:Applet>\n"
        );
    }

    #[test]
    fn test_include_markers() {
        let marker = IncludeMarker::new("nav");
        assert_eq!(marker.file, "applet_nav.swt");
        assert_eq!(
            marker.to_comment().to_html(),
            "<!-- siebel:IncludeApplet name='nav' file='applet_nav.swt' -->"
        );
        assert_eq!(
            marker.to_element().outer_html(),
            "<siebel:IncludeApplet name=\"nav\" file=\"applet_nav.swt\"></siebel:IncludeApplet>"
        );
    }
}
