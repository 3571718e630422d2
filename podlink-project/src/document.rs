//! The project document: an arena of objects addressed by [`ObjectId`].
//!
//! Objects refer to each other only through identifiers, so every mutation
//! goes through the document and ownership stays with the arena.

use crate::error::{ProjectError, ProjectResult};
use crate::object::{
    BuildConfiguration, BuildFile, BuildPhase, ConfigurationList, ExtraFields, FileReference,
    Group, NativeTarget, Object, ObjectId, Project, ShellScriptBuildPhase,
};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Name of the group holding linked libraries and frameworks.
pub const FRAMEWORKS_GROUP_NAME: &str = "Frameworks";

impl Borrow<str> for ObjectId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    archive_version: u32,
    object_version: u32,
    root_object: ObjectId,
    objects: BTreeMap<ObjectId, Object>,

    /// Top-level keys such as `classes`.
    #[serde(flatten)]
    extra: ExtraFields,

    #[serde(skip)]
    id_counter: u64,
}

impl Default for ProjectDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectDocument {
    /// An empty project: root object, main group, and a Debug/Release
    /// project-level configuration list.
    pub fn new() -> Self {
        let mut doc = Self {
            archive_version: 1,
            object_version: 46,
            root_object: ObjectId::new(""),
            objects: BTreeMap::new(),
            extra: ExtraFields::new(),
            id_counter: 0,
        };
        let main_group = doc.add_object(Object::Group(Group {
            name: None,
            path: None,
            children: vec![],
            source_tree: "<group>".to_string(),
            extra: ExtraFields::new(),
        }));
        let configuration_list = doc.new_configuration_list(&["Debug", "Release"]);
        doc.root_object = doc.add_object(Object::Project(Project {
            main_group,
            targets: vec![],
            build_configuration_list: Some(configuration_list),
            product_ref_group: None,
            extra: ExtraFields::new(),
        }));
        doc
    }

    /// Parse a document and check the root of its object graph.
    ///
    /// `path` only labels errors.
    pub fn parse(path: &Utf8Path, contents: &str) -> ProjectResult<Self> {
        let doc: Self = serde_json::from_str(contents).map_err(|source| ProjectError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let invalid = |reason: String| ProjectError::Invalid {
            path: path.to_path_buf(),
            reason,
        };
        let Some(Object::Project(project)) = doc.objects.get(&doc.root_object) else {
            return Err(invalid(format!(
                "root object {} is not a PBXProject",
                doc.root_object
            )));
        };
        if !matches!(doc.objects.get(&project.main_group), Some(Object::Group(_))) {
            return Err(invalid(format!(
                "main group {} is not a PBXGroup",
                project.main_group
            )));
        }

        Ok(doc)
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_json(&self) -> ProjectResult<String> {
        let mut out = serde_json::to_string_pretty(self).map_err(ProjectError::Serialize)?;
        out.push('\n');
        Ok(out)
    }

    pub fn root_object(&self) -> &ObjectId {
        &self.root_object
    }

    pub fn project(&self) -> ProjectResult<&Project> {
        match self.objects.get(&self.root_object) {
            Some(Object::Project(project)) => Ok(project),
            _ => Err(unexpected(&self.root_object, "PBXProject")),
        }
    }

    fn project_mut(&mut self) -> ProjectResult<&mut Project> {
        let root = self.root_object.clone();
        match self.objects.get_mut(&root) {
            Some(Object::Project(project)) => Ok(project),
            _ => Err(unexpected(&root, "PBXProject")),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = (&ObjectId, &Object)> {
        self.objects.iter()
    }

    /// Look an object up by identifier.
    pub fn find_object(&self, id: &str) -> Option<&Object> {
        self.objects.get(id)
    }

    pub fn find_object_mut(&mut self, id: &str) -> Option<&mut Object> {
        self.objects.get_mut(id)
    }

    /// Insert `object` under a freshly minted identifier.
    pub fn add_object(&mut self, object: Object) -> ObjectId {
        let id = self.generate_id();
        self.objects.insert(id.clone(), object);
        id
    }

    /// Mint an identifier not yet used in this document.
    ///
    /// Identifiers are UUIDv5 digests over the root object and a per-document
    /// counter, so the same edits on the same input yield the same ids.
    fn generate_id(&mut self) -> ObjectId {
        let namespace = Uuid::new_v5(&Uuid::NAMESPACE_OID, self.root_object.as_str().as_bytes());
        loop {
            self.id_counter += 1;
            let name = format!("podlink:{}", self.id_counter);
            let digest = Uuid::new_v5(&namespace, name.as_bytes()).simple().to_string();
            let id = ObjectId::new(digest[..24].to_ascii_uppercase());
            if !self.objects.contains_key(&id) {
                return id;
            }
        }
    }

    // ── targets ──────────────────────────────────────────────────────────

    pub fn native_target(&self, id: &str) -> Option<&NativeTarget> {
        match self.objects.get(id) {
            Some(Object::NativeTarget(target)) => Some(target),
            _ => None,
        }
    }

    fn native_target_mut(&mut self, id: &str) -> ProjectResult<&mut NativeTarget> {
        match self.objects.get_mut(id) {
            Some(Object::NativeTarget(target)) => Ok(target),
            _ => Err(unexpected_str(id, "PBXNativeTarget")),
        }
    }

    /// Native targets in project order.
    pub fn targets(&self) -> Vec<(&ObjectId, &NativeTarget)> {
        let Ok(project) = self.project() else {
            return vec![];
        };
        project
            .targets
            .iter()
            .filter_map(|id| self.native_target(id.as_str()).map(|t| (id, t)))
            .collect()
    }

    /// Add a native target with one configuration per name, an empty sources
    /// phase and an empty frameworks phase.
    pub fn new_native_target(
        &mut self,
        name: &str,
        configurations: &[&str],
    ) -> ProjectResult<ObjectId> {
        let configuration_list = self.new_configuration_list(configurations);
        let sources = self.add_object(Object::SourcesBuildPhase(BuildPhase::default()));
        let frameworks = self.add_object(Object::FrameworksBuildPhase(BuildPhase::default()));
        let target = self.add_object(Object::NativeTarget(NativeTarget {
            name: name.to_string(),
            build_configuration_list: configuration_list,
            build_phases: vec![sources, frameworks],
            product_name: Some(name.to_string()),
            product_type: Some("com.apple.product-type.application".to_string()),
            extra: ExtraFields::new(),
        }));
        self.project_mut()?.targets.push(target.clone());
        Ok(target)
    }

    // ── build configurations ─────────────────────────────────────────────

    pub fn new_configuration_list(&mut self, names: &[&str]) -> ObjectId {
        let build_configurations = names
            .iter()
            .map(|name| {
                self.add_object(Object::BuildConfiguration(BuildConfiguration {
                    name: name.to_string(),
                    build_settings: BTreeMap::new(),
                    base_configuration_reference: None,
                    extra: ExtraFields::new(),
                }))
            })
            .collect();
        self.add_object(Object::ConfigurationList(ConfigurationList {
            build_configurations,
            default_configuration_name: names.last().map(|n| n.to_string()),
            extra: ExtraFields::new(),
        }))
    }

    /// Build configurations of a target, in list order.
    pub fn build_configurations(&self, target: &str) -> Vec<(&ObjectId, &BuildConfiguration)> {
        let Some(target) = self.native_target(target) else {
            return vec![];
        };
        let Some(Object::ConfigurationList(list)) =
            self.objects.get(&target.build_configuration_list)
        else {
            return vec![];
        };
        list.build_configurations
            .iter()
            .filter_map(|id| match self.objects.get(id) {
                Some(Object::BuildConfiguration(config)) => Some((id, config)),
                _ => None,
            })
            .collect()
    }

    pub fn build_configuration_mut(&mut self, id: &str) -> ProjectResult<&mut BuildConfiguration> {
        match self.objects.get_mut(id) {
            Some(Object::BuildConfiguration(config)) => Ok(config),
            _ => Err(unexpected_str(id, "XCBuildConfiguration")),
        }
    }

    // ── build phases ─────────────────────────────────────────────────────

    pub fn build_phases(&self, target: &str) -> &[ObjectId] {
        self.native_target(target)
            .map(|t| t.build_phases.as_slice())
            .unwrap_or_default()
    }

    pub fn frameworks_build_phase(&self, target: &str) -> Option<&ObjectId> {
        self.build_phases(target)
            .iter()
            .find(|id| matches!(self.objects.get(*id), Some(Object::FrameworksBuildPhase(_))))
    }

    /// The target's frameworks phase, appending an empty one when missing.
    pub fn ensure_frameworks_build_phase(&mut self, target: &str) -> ProjectResult<ObjectId> {
        if let Some(phase) = self.frameworks_build_phase(target) {
            return Ok(phase.clone());
        }
        // Fail before minting anything when the target is unknown.
        self.native_target_mut(target)?;
        let phase = self.add_object(Object::FrameworksBuildPhase(BuildPhase::default()));
        self.native_target_mut(target)?
            .build_phases
            .push(phase.clone());
        Ok(phase)
    }

    /// Objects linked by the target's frameworks phase, resolved through their
    /// build files. Dangling build files are skipped.
    pub fn linked_references(&self, target: &str) -> Vec<(&ObjectId, &Object)> {
        let Some(phase) = self.frameworks_build_phase(target) else {
            return vec![];
        };
        let Some(Object::FrameworksBuildPhase(phase)) = self.objects.get(phase) else {
            return vec![];
        };
        phase
            .files
            .iter()
            .filter_map(|build_file| match self.objects.get(build_file) {
                Some(Object::BuildFile(bf)) => self.objects.get_key_value(&bf.file_ref),
                _ => None,
            })
            .collect()
    }

    /// Append a build file for `file_ref` to a frameworks, sources or
    /// resources phase.
    pub fn add_build_file(&mut self, phase: &str, file_ref: &ObjectId) -> ProjectResult<ObjectId> {
        if !matches!(
            self.objects.get(phase),
            Some(
                Object::FrameworksBuildPhase(_)
                    | Object::SourcesBuildPhase(_)
                    | Object::ResourcesBuildPhase(_)
            )
        ) {
            return Err(unexpected_str(phase, "build phase"));
        }
        let build_file = self.add_object(Object::BuildFile(BuildFile {
            file_ref: file_ref.clone(),
            extra: ExtraFields::new(),
        }));
        match self.objects.get_mut(phase) {
            Some(
                Object::FrameworksBuildPhase(p)
                | Object::SourcesBuildPhase(p)
                | Object::ResourcesBuildPhase(p),
            ) => p.files.push(build_file.clone()),
            _ => return Err(unexpected_str(phase, "build phase")),
        }
        Ok(build_file)
    }

    /// Create a shell script phase that is not yet attached to any target.
    pub fn new_shell_script_build_phase(&mut self, name: &str, script: &str) -> ObjectId {
        self.add_object(Object::ShellScriptBuildPhase(ShellScriptBuildPhase {
            name: Some(name.to_string()),
            files: vec![],
            input_paths: vec![],
            output_paths: vec![],
            shell_path: "/bin/sh".to_string(),
            shell_script: script.to_string(),
            extra: ExtraFields::new(),
        }))
    }

    pub fn push_build_phase(&mut self, target: &str, phase: ObjectId) -> ProjectResult<()> {
        self.native_target_mut(target)?.build_phases.push(phase);
        Ok(())
    }

    /// Insert `phase` at `index` of the target's phases; past-the-end appends.
    pub fn insert_build_phase(
        &mut self,
        target: &str,
        index: usize,
        phase: ObjectId,
    ) -> ProjectResult<()> {
        let phases = &mut self.native_target_mut(target)?.build_phases;
        let index = index.min(phases.len());
        phases.insert(index, phase);
        Ok(())
    }

    // ── file tree ────────────────────────────────────────────────────────

    pub fn main_group(&self) -> ProjectResult<ObjectId> {
        Ok(self.project()?.main_group.clone())
    }

    fn group_mut(&mut self, id: &str) -> ProjectResult<&mut Group> {
        match self.objects.get_mut(id) {
            Some(Object::Group(group)) => Ok(group),
            _ => Err(unexpected_str(id, "PBXGroup")),
        }
    }

    /// The `Frameworks` group of the main group, created when absent.
    pub fn frameworks_group(&mut self) -> ProjectResult<ObjectId> {
        let main_group = self.main_group()?;
        let children = self.group_mut(main_group.as_str())?.children.clone();
        let existing = children.into_iter().find(|child| {
            matches!(
                self.objects.get(child),
                Some(Object::Group(g)) if g.display_name() == Some(FRAMEWORKS_GROUP_NAME)
            )
        });
        if let Some(group) = existing {
            return Ok(group);
        }

        let group = self.add_object(Object::Group(Group {
            name: Some(FRAMEWORKS_GROUP_NAME.to_string()),
            path: None,
            children: vec![],
            source_tree: "<group>".to_string(),
            extra: ExtraFields::new(),
        }));
        self.group_mut(main_group.as_str())?
            .children
            .push(group.clone());
        Ok(group)
    }

    /// First file reference whose `path` equals `path`.
    pub fn file_reference_by_path(&self, path: &str) -> Option<&ObjectId> {
        self.objects.iter().find_map(|(id, object)| match object {
            Object::FileReference(r) if r.path == path => Some(id),
            _ => None,
        })
    }

    /// Add a group-relative file reference for `path` to the main group.
    pub fn new_file_reference(&mut self, path: &str) -> ProjectResult<ObjectId> {
        let main_group = self.main_group()?;
        self.add_file_reference(
            main_group.as_str(),
            FileReference {
                name: None,
                path: path.to_string(),
                source_tree: "<group>".to_string(),
                last_known_file_type: file_type_for(path).map(str::to_string),
                explicit_file_type: None,
                include_in_index: None,
                extra: ExtraFields::new(),
            },
        )
    }

    /// Add a reference to the static library `lib<label>.a` built by Xcode.
    pub fn new_static_library(&mut self, group: &str, label: &str) -> ProjectResult<ObjectId> {
        self.add_file_reference(
            group,
            FileReference {
                name: None,
                path: format!("lib{label}.a"),
                source_tree: "BUILT_PRODUCTS_DIR".to_string(),
                last_known_file_type: None,
                explicit_file_type: Some("archive.ar".to_string()),
                include_in_index: Some(0),
                extra: ExtraFields::new(),
            },
        )
    }

    pub fn add_file_reference(
        &mut self,
        group: &str,
        reference: FileReference,
    ) -> ProjectResult<ObjectId> {
        // Fail before minting anything when the group is unknown.
        self.group_mut(group)?;
        let id = self.add_object(Object::FileReference(reference));
        self.group_mut(group)?.children.push(id.clone());
        Ok(id)
    }
}

fn file_type_for(path: &str) -> Option<&'static str> {
    let extension = Utf8Path::new(path).extension()?;
    let file_type = match extension {
        "xcconfig" => "text.xcconfig",
        "a" => "archive.ar",
        "sh" => "text.script.sh",
        "h" => "sourcecode.c.h",
        "m" => "sourcecode.c.objc",
        "framework" => "wrapper.framework",
        "plist" => "text.plist.xml",
        _ => return None,
    };
    Some(file_type)
}

fn unexpected(id: &ObjectId, expected: &'static str) -> ProjectError {
    ProjectError::UnexpectedObject {
        id: id.clone(),
        expected,
    }
}

fn unexpected_str(id: &str, expected: &'static str) -> ProjectError {
    ProjectError::UnexpectedObject {
        id: ObjectId::new(id),
        expected,
    }
}
