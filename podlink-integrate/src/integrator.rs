//! Links one pod library into the consumer targets of one user project.

use crate::error::{IntegrateError, IntegrateResult};
use crate::overrides::detect_overrides;
use crate::patch::render_patch;
use crate::phases::{
    CHECK_MANIFEST_PHASE_NAME, CHECK_MANIFEST_SCRIPT, COPY_RESOURCES_PHASE_NAME,
    copy_resources_script,
};
use camino::Utf8PathBuf;
use podlink_hash::sha256_hex;
use podlink_project::{Object, ObjectId, ProjectDocument, ProjectStore};
use podlink_types::diagnostic::Diagnostic;
use podlink_types::event::{IntegrationEvent, IntegrationStep};
use podlink_types::library::IntegrationTarget;
use podlink_types::report::FileChange;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct IntegrateOptions {
    /// Apply every mutation in memory and render a patch, but do not save.
    pub dry_run: bool,
}

/// A native target of the user project, by identifier and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    pub id: ObjectId,
    pub name: String,
}

impl TargetRef {
    fn names(targets: &[TargetRef]) -> Vec<String> {
        targets.iter().map(|t| t.name.clone()).collect()
    }
}

/// Everything one integration produced.
#[derive(Debug, Clone)]
pub struct IntegrationOutcome {
    pub product_name: String,
    pub project_path: Utf8PathBuf,
    /// Targets mutated by this run, in descriptor order.
    pub integrated_targets: Vec<TargetRef>,
    /// Declared targets that already linked the library.
    pub skipped_targets: Vec<TargetRef>,
    pub diagnostics: Vec<Diagnostic>,
    pub events: Vec<IntegrationEvent>,
    /// True when the project was written back.
    pub saved: bool,
    pub file_change: Option<FileChange>,
    /// Unified diff of the project document; empty when nothing changed.
    pub patch: String,
}

impl IntegrationOutcome {
    fn new(library: &IntegrationTarget) -> Self {
        Self {
            product_name: library.product_name.clone(),
            project_path: library.user_project_path.clone(),
            integrated_targets: Vec::new(),
            skipped_targets: Vec::new(),
            diagnostics: Vec::new(),
            events: Vec::new(),
            saved: false,
            file_change: None,
            patch: String::new(),
        }
    }

    /// True when every declared target was already integrated.
    pub fn is_noop(&self) -> bool {
        self.integrated_targets.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }
}

#[derive(Debug, Clone)]
struct Resolution {
    pending: Vec<TargetRef>,
    integrated: Vec<TargetRef>,
}

/// Integrates one library descriptor into its user project.
///
/// The project is opened on first use and cached for the lifetime of the
/// integrator, so integrators must not be shared between libraries: each one
/// has to observe what earlier integrators saved. Shared references created
/// during a run (the xcconfig file reference and the static library reference)
/// are created at most once.
pub struct TargetIntegrator<'a> {
    library: &'a IntegrationTarget,
    store: &'a dyn ProjectStore,
    project: Option<ProjectDocument>,
    resolution: Option<Resolution>,
    xcconfig_reference: Option<ObjectId>,
    library_reference: Option<ObjectId>,
}

impl<'a> TargetIntegrator<'a> {
    pub fn new(library: &'a IntegrationTarget, store: &'a dyn ProjectStore) -> Self {
        Self {
            library,
            store,
            project: None,
            resolution: None,
            xcconfig_reference: None,
            library_reference: None,
        }
    }

    pub fn library(&self) -> &IntegrationTarget {
        self.library
    }

    /// The declared targets that do not link the library yet, in descriptor
    /// order with duplicates removed.
    ///
    /// Fails with [`IntegrateError::MissingTarget`] when an identifier does not
    /// name a native target.
    pub fn targets(&mut self) -> IntegrateResult<Vec<TargetRef>> {
        Ok(self.resolve()?.pending)
    }

    /// Applies every integration step to the pending targets and saves the
    /// project once. Does nothing, not even a save, when no target is pending.
    pub fn integrate(mut self, options: &IntegrateOptions) -> IntegrateResult<IntegrationOutcome> {
        let library = self.library;
        let resolution = self.resolve()?;
        let mut outcome = IntegrationOutcome::new(library);
        outcome.skipped_targets = resolution.integrated;

        let pending = resolution.pending;
        if pending.is_empty() {
            debug!(
                library = %library.product_name,
                project = %library.user_project_path,
                "all targets already integrated"
            );
            return Ok(outcome);
        }

        let names = TargetRef::names(&pending);
        info!(
            library = %library.product_name,
            project = %library.user_project_path,
            targets = ?names,
            "integrating library"
        );
        outcome.events.push(IntegrationEvent::Section {
            library: library.product_name.clone(),
            project_path: library.user_project_path.to_string(),
            target_count: pending.len() as u64,
            targets: names.clone(),
        });

        let before = self.document()?.to_json()?;

        for step in IntegrationStep::ORDERED {
            match step {
                IntegrationStep::BaseConfiguration => {
                    self.add_xcconfig_base_configuration(&pending, &mut outcome.diagnostics)?
                }
                IntegrationStep::LibraryReference => self.add_pods_library(&pending)?,
                IntegrationStep::CopyResourcesPhase => self.add_copy_resources_script_phase(&pending)?,
                IntegrationStep::CheckManifestPhase => self.add_check_manifest_lock_script_phase(&pending)?,
            }
            debug!(step = step.label(), targets = pending.len(), "step applied");
            outcome.events.push(IntegrationEvent::StepCompleted {
                step,
                targets: names.clone(),
            });
        }

        let after = self.document()?.to_json()?;
        outcome.patch = render_patch(library.user_project_path.as_str(), &before, &after);

        if options.dry_run {
            info!(project = %library.user_project_path, "dry run; project not saved");
        } else {
            self.save()?;
            outcome.saved = true;
            outcome.file_change = Some(FileChange {
                path: library.user_project_path.to_string(),
                sha256_before: Some(sha256_hex(before.as_bytes())),
                sha256_after: Some(sha256_hex(after.as_bytes())),
            });
            outcome.events.push(IntegrationEvent::Saved {
                project_path: library.user_project_path.to_string(),
            });
        }

        outcome.integrated_targets = pending;
        Ok(outcome)
    }

    fn document(&mut self) -> IntegrateResult<&mut ProjectDocument> {
        let doc = match self.project.take() {
            Some(doc) => doc,
            None => {
                debug!(project = %self.library.user_project_path, "loading user project");
                self.store.open(&self.library.user_project_path)?
            }
        };
        Ok(self.project.insert(doc))
    }

    fn resolve(&mut self) -> IntegrateResult<Resolution> {
        if let Some(resolution) = &self.resolution {
            return Ok(resolution.clone());
        }

        let library = self.library;
        let doc = self.document()?;
        let mut pending = Vec::new();
        let mut integrated = Vec::new();

        for uuid in library.unique_target_uuids() {
            let Some(target) = doc.native_target(uuid) else {
                return Err(IntegrateError::MissingTarget {
                    uuid: uuid.to_string(),
                    library: library.product_name.clone(),
                    project: library.user_project_path.clone(),
                });
            };
            let target_ref = TargetRef {
                id: ObjectId::new(uuid),
                name: target.name.clone(),
            };
            if is_integrated(doc, uuid, &library.product_name) {
                debug!(target = %target_ref.name, library = %library.product_name, "already integrated");
                integrated.push(target_ref);
            } else {
                pending.push(target_ref);
            }
        }

        let resolution = Resolution { pending, integrated };
        self.resolution = Some(resolution.clone());
        Ok(resolution)
    }

    fn save(&mut self) -> IntegrateResult<()> {
        let store = self.store;
        let library = self.library;
        let doc = self.document()?;
        store.save(&library.user_project_path, doc)?;
        info!(project = %library.user_project_path, "saved user project");
        Ok(())
    }

    fn xcconfig_reference(&mut self) -> IntegrateResult<ObjectId> {
        if let Some(id) = &self.xcconfig_reference {
            return Ok(id.clone());
        }
        let path = self.library.xcconfig_relative_path.as_str();
        let doc = self.document()?;
        let id = match doc.file_reference_by_path(path) {
            Some(existing) => existing.clone(),
            None => doc.new_file_reference(path)?,
        };
        self.xcconfig_reference = Some(id.clone());
        Ok(id)
    }

    fn library_reference(&mut self) -> IntegrateResult<ObjectId> {
        if let Some(id) = &self.library_reference {
            return Ok(id.clone());
        }
        let label = self.library.label.as_str();
        let doc = self.document()?;
        let group = doc.frameworks_group()?;
        let id = doc.new_static_library(group.as_str(), label)?;
        self.library_reference = Some(id.clone());
        Ok(id)
    }

    /// Attaches the xcconfig to every build configuration of every pending
    /// target, warning about target settings that would shadow it.
    fn add_xcconfig_base_configuration(
        &mut self,
        targets: &[TargetRef],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> IntegrateResult<()> {
        let library = self.library;
        let xcconfig = self.xcconfig_reference()?;
        let doc = self.document()?;

        for target in targets {
            let configs = doc.build_configurations(target.id.as_str());
            let found = detect_overrides(
                &target.name,
                configs.iter().map(|(_, config)| *config),
                &library.xcconfig_attributes,
                &library.xcconfig_relative_path,
            );
            let config_ids: Vec<ObjectId> = configs.iter().map(|(id, _)| (*id).clone()).collect();

            for diagnostic in found {
                warn!(
                    target = %target.name,
                    key = diagnostic.key.as_deref().unwrap_or_default(),
                    configurations = ?diagnostic.configurations,
                    "target overrides xcconfig build setting"
                );
                diagnostics.push(diagnostic);
            }

            for id in config_ids {
                doc.build_configuration_mut(id.as_str())?
                    .base_configuration_reference = Some(xcconfig.clone());
            }
        }
        Ok(())
    }

    fn add_pods_library(&mut self, targets: &[TargetRef]) -> IntegrateResult<()> {
        let library_ref = self.library_reference()?;
        let doc = self.document()?;
        for target in targets {
            let phase = doc.ensure_frameworks_build_phase(target.id.as_str())?;
            doc.add_build_file(phase.as_str(), &library_ref)?;
        }
        Ok(())
    }

    fn add_copy_resources_script_phase(&mut self, targets: &[TargetRef]) -> IntegrateResult<()> {
        let script = copy_resources_script(&self.library.copy_resources_script_relative_path);
        let doc = self.document()?;
        for target in targets {
            let phase = doc.new_shell_script_build_phase(COPY_RESOURCES_PHASE_NAME, &script);
            doc.push_build_phase(target.id.as_str(), phase)?;
        }
        Ok(())
    }

    fn add_check_manifest_lock_script_phase(&mut self, targets: &[TargetRef]) -> IntegrateResult<()> {
        let doc = self.document()?;
        for target in targets {
            let phase = doc.new_shell_script_build_phase(CHECK_MANIFEST_PHASE_NAME, CHECK_MANIFEST_SCRIPT);
            doc.insert_build_phase(target.id.as_str(), 0, phase)?;
        }
        Ok(())
    }
}

/// True when the frameworks phase of `target` links a file reference whose
/// display name is `product_name`. Objects of other kinds never count, even
/// with a matching name.
pub fn is_integrated(doc: &ProjectDocument, target: &str, product_name: &str) -> bool {
    doc.linked_references(target)
        .into_iter()
        .any(|(_, object)| matches!(object, Object::FileReference(r) if r.display_name() == product_name))
}
