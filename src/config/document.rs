/*!
 * Rules Document
 * XML rule definitions with name- and path-based lookup
 *
 * ```xml
 * <filters>
 *   <default_rules>
 *     <NX_class><fsobject_type>FOLDER</fsobject_type></NX_class>
 *     <table_csv><separator>;</separator></table_csv>
 *   </default_rules>
 *   <specific_rules>
 *     <object>
 *       <path>/entry/data</path>
 *       <mode>image</mode>
 *       <image><fsobject_type>FOLDER</fsobject_type><extension>.tif</extension></image>
 *     </object>
 *   </specific_rules>
 * </filters>
 * ```
 */

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use crate::core::{NxfsError, NxfsResult};

/// Flattened option name to value
pub type OptionMap = BTreeMap<String, String>;

const ROOT_ELEMENT: &str = "filters";
const DEFAULT_RULES: &str = "default_rules";
const SPECIFIC_RULES: &str = "specific_rules";

/// Override keyed by a source path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecificRule {
    pub path: String,
    /// Empty when the object does not declare a mode
    pub mode: String,
    pub options: OptionMap,
}

/// Parsed rules document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleDocument {
    /// In document order; the first entry with a name wins
    defaults: Vec<(String, OptionMap)>,
    specifics: Vec<SpecificRule>,
}

impl RuleDocument {
    /// Document without any rules
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_file(path: impl AsRef<Path>) -> NxfsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| NxfsError::ConfigParse(format!("{}: {}", path.display(), e)))?;
        let document = Self::parse(&text)?;
        info!(
            rules = %path.display(),
            defaults = document.defaults.len(),
            specifics = document.specifics.len(),
            "Loaded rules document"
        );
        Ok(document)
    }

    pub fn parse(text: &str) -> NxfsResult<Self> {
        let root = XmlElement::parse(text)?;
        if root.name != ROOT_ELEMENT {
            return Err(NxfsError::ConfigParse(format!(
                "root element is <{}>, expected <{}>",
                root.name, ROOT_ELEMENT
            )));
        }

        let mut document = Self::default();

        if let Some(defaults) = root.child(DEFAULT_RULES) {
            for rule in &defaults.children {
                let mut options = OptionMap::new();
                flatten(&rule.children, "", &mut options);
                document.defaults.push((rule.name.clone(), options));
            }
        }

        if let Some(specifics) = root.child(SPECIFIC_RULES) {
            for object in &specifics.children {
                let path = object.child_text("path");
                let mode = object.child_text("mode");
                let mut options = OptionMap::new();
                if let Some(section) = object.child(&mode).filter(|_| !mode.is_empty()) {
                    flatten(&section.children, "", &mut options);
                }
                document.specifics.push(SpecificRule { path, mode, options });
            }
        }

        Ok(document)
    }

    /// Check whether a default rule with this name exists
    pub fn find_default_rule(&self, name: &str) -> bool {
        self.default_rule(name).is_some()
    }

    /// Options of the named default rule, empty when absent
    pub fn fetch_default_rule(&self, name: &str) -> OptionMap {
        self.default_rule(name).cloned().unwrap_or_default()
    }

    /// Mode of the first specific rule matching `path`
    ///
    /// A matching rule without a mode is logged and hides later matches.
    pub fn find_specific_rule(&self, path: &str) -> Option<&str> {
        let rule = self.specifics.iter().find(|rule| rule.path == path)?;
        if rule.mode.is_empty() {
            warn!(
                path = %path,
                rule_location = "/filters/specific_rules/object/mode",
                "Specific rule has no mode and will not be applied"
            );
            return None;
        }
        Some(&rule.mode)
    }

    /// Options of the specific rule for `path`, merged over the default rule
    /// named after its mode
    pub fn fetch_specific_rule(&self, path: &str) -> OptionMap {
        let Some(rule) = self.specifics.iter().find(|rule| rule.path == path) else {
            return OptionMap::new();
        };

        let mut options = rule.options.clone();
        if let Some(defaults) = self.default_rule(&rule.mode) {
            for (key, value) in defaults {
                options.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
        options
    }

    pub fn specific_rules(&self) -> &[SpecificRule] {
        &self.specifics
    }

    fn default_rule(&self, name: &str) -> Option<&OptionMap> {
        self.defaults
            .iter()
            .find(|(rule_name, _)| rule_name == name)
            .map(|(_, options)| options)
    }
}

/// Leaf elements become `prefix + name`; nested elements extend the prefix with `name_`
fn flatten(elements: &[XmlElement], prefix: &str, out: &mut OptionMap) {
    for element in elements {
        if element.children.is_empty() {
            out.entry(format!("{}{}", prefix, element.name))
                .or_insert_with(|| element.text.clone());
        } else {
            let nested = format!("{}{}_", prefix, element.name);
            flatten(&element.children, &nested, out);
        }
    }
}

/// Minimal element tree; attributes are not used by the rules schema
#[derive(Debug, Clone, Default)]
struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn parse(text: &str) -> NxfsResult<Self> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                NxfsError::ConfigParse(format!("at byte {}: {}", reader.error_position(), e))
            })?;

            match event {
                Event::Start(start) => stack.push(XmlElement {
                    name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
                    ..Default::default()
                }),
                Event::Empty(empty) => {
                    let element = XmlElement {
                        name: String::from_utf8_lossy(empty.name().as_ref()).into_owned(),
                        ..Default::default()
                    };
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(content) => {
                    let content = content
                        .unescape()
                        .map_err(|e| NxfsError::ConfigParse(e.to_string()))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&content);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        NxfsError::ConfigParse("unbalanced closing tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(NxfsError::ConfigParse("unexpected end of document".to_string()));
        }
        root.ok_or_else(|| NxfsError::ConfigParse("document has no root element".to_string()))
    }

    fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    fn child_text(&self, name: &str) -> String {
        self.child(name).map(|c| c.text.clone()).unwrap_or_default()
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> NxfsResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(NxfsError::ConfigParse(
            "document has more than one root element".to_string(),
        )),
    }
}
