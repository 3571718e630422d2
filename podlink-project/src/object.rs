//! Object kinds stored in the project arena.
//!
//! Field names follow the pbxproj keys (camelCase). Keys a struct does not
//! model are kept in its `extra` map, and objects of an unmodeled `isa` are
//! kept whole as [`RawObject`], so a load/save cycle drops nothing.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{self, SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Keys of an object that podlink does not model, written back as read.
pub type ExtraFields = BTreeMap<String, Value>;

/// Identifier of an object in the project arena (24 upper-case hex digits in
/// Xcode-authored projects, but any string is accepted).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One entry of the pbxproj `objects` table, discriminated by its `isa`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Project(Project),
    Group(Group),
    VariantGroup(Group),
    FileReference(FileReference),
    ReferenceProxy(ReferenceProxy),
    BuildFile(BuildFile),
    NativeTarget(NativeTarget),
    FrameworksBuildPhase(BuildPhase),
    SourcesBuildPhase(BuildPhase),
    ResourcesBuildPhase(BuildPhase),
    ShellScriptBuildPhase(ShellScriptBuildPhase),
    ConfigurationList(ConfigurationList),
    BuildConfiguration(BuildConfiguration),
    /// Any other kind (`PBXTargetDependency`, `PBXCopyFilesBuildPhase`, ...).
    Other(RawObject),
}

/// An object of a kind podlink never inspects, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    pub isa: String,
    /// Every key except `isa`.
    pub fields: Map<String, Value>,
}

impl Object {
    /// The pbxproj `isa` of this object.
    pub fn isa(&self) -> &str {
        match self {
            Object::Project(_) => "PBXProject",
            Object::Group(_) => "PBXGroup",
            Object::VariantGroup(_) => "PBXVariantGroup",
            Object::FileReference(_) => "PBXFileReference",
            Object::ReferenceProxy(_) => "PBXReferenceProxy",
            Object::BuildFile(_) => "PBXBuildFile",
            Object::NativeTarget(_) => "PBXNativeTarget",
            Object::FrameworksBuildPhase(_) => "PBXFrameworksBuildPhase",
            Object::SourcesBuildPhase(_) => "PBXSourcesBuildPhase",
            Object::ResourcesBuildPhase(_) => "PBXResourcesBuildPhase",
            Object::ShellScriptBuildPhase(_) => "PBXShellScriptBuildPhase",
            Object::ConfigurationList(_) => "XCConfigurationList",
            Object::BuildConfiguration(_) => "XCBuildConfiguration",
            Object::Other(raw) => &raw.isa,
        }
    }

    /// Name shown in the Xcode navigator, for file-tree objects.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            Object::FileReference(r) => Some(r.display_name()),
            Object::ReferenceProxy(p) => p.display_name(),
            Object::Group(g) | Object::VariantGroup(g) => g.display_name(),
            Object::NativeTarget(t) => Some(&t.name),
            Object::ShellScriptBuildPhase(p) => p.name.as_deref(),
            _ => None,
        }
    }
}

impl Serialize for Object {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let payload = match self {
            Object::Project(o) => serde_json::to_value(o),
            Object::Group(o) | Object::VariantGroup(o) => serde_json::to_value(o),
            Object::FileReference(o) => serde_json::to_value(o),
            Object::ReferenceProxy(o) => serde_json::to_value(o),
            Object::BuildFile(o) => serde_json::to_value(o),
            Object::NativeTarget(o) => serde_json::to_value(o),
            Object::FrameworksBuildPhase(o)
            | Object::SourcesBuildPhase(o)
            | Object::ResourcesBuildPhase(o) => serde_json::to_value(o),
            Object::ShellScriptBuildPhase(o) => serde_json::to_value(o),
            Object::ConfigurationList(o) => serde_json::to_value(o),
            Object::BuildConfiguration(o) => serde_json::to_value(o),
            Object::Other(raw) => Ok(Value::Object(raw.fields.clone())),
        }
        .map_err(<S::Error as ser::Error>::custom)?;
        let Value::Object(fields) = payload else {
            return Err(ser::Error::custom(format!(
                "{} did not serialize to a map",
                self.isa()
            )));
        };

        let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
        map.serialize_entry("isa", self.isa())?;
        for (key, value) in &fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Object {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let isa = match fields.remove("isa") {
            Some(Value::String(isa)) => isa,
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "`isa` must be a string, found {other}"
                )));
            }
            None => return Err(de::Error::missing_field("isa")),
        };

        let object = match isa.as_str() {
            "PBXProject" => payload(fields).map(Object::Project),
            "PBXGroup" => payload(fields).map(Object::Group),
            "PBXVariantGroup" => payload(fields).map(Object::VariantGroup),
            "PBXFileReference" => payload(fields).map(Object::FileReference),
            "PBXReferenceProxy" => payload(fields).map(Object::ReferenceProxy),
            "PBXBuildFile" => payload(fields).map(Object::BuildFile),
            "PBXNativeTarget" => payload(fields).map(Object::NativeTarget),
            "PBXFrameworksBuildPhase" => payload(fields).map(Object::FrameworksBuildPhase),
            "PBXSourcesBuildPhase" => payload(fields).map(Object::SourcesBuildPhase),
            "PBXResourcesBuildPhase" => payload(fields).map(Object::ResourcesBuildPhase),
            "PBXShellScriptBuildPhase" => payload(fields).map(Object::ShellScriptBuildPhase),
            "XCConfigurationList" => payload(fields).map(Object::ConfigurationList),
            "XCBuildConfiguration" => payload(fields).map(Object::BuildConfiguration),
            _ => {
                return Ok(Object::Other(RawObject {
                    isa: isa.clone(),
                    fields,
                }));
            }
        };
        object.map_err(|e| de::Error::custom(format!("invalid {isa} object: {e}")))
    }
}

fn payload<T: DeserializeOwned>(fields: Map<String, Value>) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(fields))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub main_group: ObjectId,

    #[serde(default)]
    pub targets: Vec<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_configuration_list: Option<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_ref_group: Option<ObjectId>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default)]
    pub children: Vec<ObjectId>,

    #[serde(default = "default_source_tree")]
    pub source_tree: String,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Group {
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.path.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub path: String,

    #[serde(default = "default_source_tree")]
    pub source_tree: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_known_file_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_file_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_in_index: Option<u8>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl FileReference {
    /// Explicit `name`, falling back to the last component of `path`.
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// Reference to a product of another project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceProxy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,

    #[serde(default = "default_source_tree")]
    pub source_tree: String,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl ReferenceProxy {
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.path.as_deref().and_then(|p| p.rsplit('/').next()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildFile {
    pub file_ref: ObjectId,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTarget {
    pub name: String,

    pub build_configuration_list: ObjectId,

    #[serde(default)]
    pub build_phases: Vec<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPhase {
    #[serde(default)]
    pub files: Vec<ObjectId>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellScriptBuildPhase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub files: Vec<ObjectId>,

    #[serde(default)]
    pub input_paths: Vec<String>,

    #[serde(default)]
    pub output_paths: Vec<String>,

    #[serde(default = "default_shell_path")]
    pub shell_path: String,

    pub shell_script: String,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationList {
    #[serde(default)]
    pub build_configurations: Vec<ObjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_configuration_name: Option<String>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfiguration {
    pub name: String,

    #[serde(default)]
    pub build_settings: BTreeMap<String, SettingValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_configuration_reference: Option<ObjectId>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// A build setting value; pbxproj stores either a string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Text(String),
    List(Vec<String>),
}

impl SettingValue {
    pub fn is_empty(&self) -> bool {
        match self {
            SettingValue::Text(s) => s.is_empty(),
            SettingValue::List(items) => items.is_empty(),
        }
    }

    /// True when `token` occurs in the value (in any element, for lists).
    pub fn contains(&self, token: &str) -> bool {
        match self {
            SettingValue::Text(s) => s.contains(token),
            SettingValue::List(items) => items.iter().any(|item| item.contains(token)),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

fn default_source_tree() -> String {
    "<group>".to_string()
}

fn default_shell_path() -> String {
    "/bin/sh".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_reference_display_name_prefers_name() {
        let named = FileReference {
            name: Some("libPods.a".to_string()),
            path: "build/libPods-debug.a".to_string(),
            source_tree: "BUILT_PRODUCTS_DIR".to_string(),
            last_known_file_type: None,
            explicit_file_type: None,
            include_in_index: None,
            extra: ExtraFields::new(),
        };
        assert_eq!(named.display_name(), "libPods.a");

        let unnamed = FileReference {
            name: None,
            ..named
        };
        assert_eq!(unnamed.display_name(), "libPods-debug.a");
    }

    #[test]
    fn setting_value_contains_checks_list_elements() {
        let list = SettingValue::List(vec!["-ObjC".to_string(), "$(inherited)".to_string()]);
        assert!(list.contains("$(inherited)"));
        assert!(!SettingValue::from("-lfoo").contains("$(inherited)"));
        assert!(SettingValue::List(vec![]).is_empty());
        assert!(SettingValue::from("").is_empty());
    }

    #[test]
    fn object_serializes_with_isa_tag() {
        let object = Object::BuildFile(BuildFile {
            file_ref: ObjectId::new("AAAA"),
            extra: ExtraFields::new(),
        });
        let value = serde_json::to_value(&object).expect("serialize");
        assert_eq!(value["isa"], "PBXBuildFile");
        assert_eq!(value["fileRef"], "AAAA");
    }

    #[test]
    fn setting_value_parses_string_or_list() {
        let text: SettingValue = serde_json::from_str(r#""-ObjC""#).expect("text");
        let list: SettingValue = serde_json::from_str(r#"["a", "b"]"#).expect("list");
        assert_eq!(text, SettingValue::from("-ObjC"));
        assert_eq!(
            list,
            SettingValue::List(vec!["a".to_string(), "b".to_string()])
        );
    }
}
