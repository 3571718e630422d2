//! Script build phases added to integrated targets.

/// Appended phase that copies pod resources into the product.
pub const COPY_RESOURCES_PHASE_NAME: &str = "Copy Pods Resources";

/// Phase inserted first so a stale sandbox fails the build before anything else runs.
pub const CHECK_MANIFEST_PHASE_NAME: &str = "Check Pods Manifest.lock";

pub const CHECK_MANIFEST_SCRIPT: &str = r#"diff "${PODS_ROOT}/../Podfile.lock" "${PODS_ROOT}/Manifest.lock" > /dev/null
if [[ $? != 0 ]] ; then
    cat << EOM
error: The sandbox is not in sync with the Podfile.lock. Run 'pod install' or update your CocoaPods installation.
EOM
    exit 1
fi
"#;

/// Script body invoking the generated resources script; quoted so paths with
/// spaces survive.
pub fn copy_resources_script(script_path: &str) -> String {
    format!("\"{script_path}\"\n")
}
