//! Minimal analyzers used as plugins in integration tests

use layerscan::{AnalyzerError, FileMap, FilePattern, Os, OsAnalyzer, Package, PkgAnalyzer};
use std::sync::atomic::{AtomicUsize, Ordering};

const OS_RELEASE: &str = "etc/os-release";
const DPKG_STATUS: &str = "var/lib/dpkg/status";
const APK_INSTALLED: &str = "lib/apk/db/installed";

/// Reports Ubuntu Bionic when os-release carries `ID=ubuntu`
pub struct UbuntuAnalyzer;

impl OsAnalyzer for UbuntuAnalyzer {
    fn name(&self) -> &str {
        "ubuntu"
    }

    fn required_files(&self) -> Vec<FilePattern> {
        vec![FilePattern::exact("/etc/os-release")]
    }

    fn analyze(&self, files: &FileMap) -> Result<Os, AnalyzerError> {
        let content = files
            .get_str(OS_RELEASE)
            .ok_or_else(|| AnalyzerError::missing(OS_RELEASE))?;

        if content.lines().any(|line| line.trim() == "ID=ubuntu") {
            Ok(Os::new("bionic", "debian"))
        } else {
            Err(AnalyzerError::NotApplicable("not ubuntu".to_string()))
        }
    }
}

/// Parses `Package:` / `Version:` stanzas
pub struct DpkgAnalyzer;

impl PkgAnalyzer for DpkgAnalyzer {
    fn name(&self) -> &str {
        "dpkg"
    }

    fn required_files(&self) -> Vec<FilePattern> {
        vec![FilePattern::exact(DPKG_STATUS)]
    }

    fn analyze(&self, files: &FileMap) -> Result<Vec<Package>, AnalyzerError> {
        let content = files
            .get_str(DPKG_STATUS)
            .ok_or_else(|| AnalyzerError::missing(DPKG_STATUS))?;

        let mut packages = Vec::new();
        for stanza in content.split("\n\n").filter(|s| !s.trim().is_empty()) {
            let field = |key: &str| {
                stanza
                    .lines()
                    .find_map(|l| l.strip_prefix(key))
                    .map(|v| v.trim().to_string())
            };
            let name = field("Package:").ok_or_else(|| {
                AnalyzerError::malformed(DPKG_STATUS, anyhow::anyhow!("stanza without Package"))
            })?;
            let version = field("Version:").unwrap_or_default();
            let (epoch, version) = match version.split_once(':') {
                Some((epoch, rest)) => (
                    epoch
                        .parse::<i32>()
                        .map_err(|e| AnalyzerError::malformed(DPKG_STATUS, e))?,
                    rest.to_string(),
                ),
                None => (0, version.clone()),
            };
            let (version, release) = match version.rsplit_once('-') {
                Some((v, r)) => (v.to_string(), r.to_string()),
                None => (version.clone(), String::new()),
            };
            packages.push(Package::new(name, version, release).with_epoch(epoch));
        }
        Ok(packages)
    }
}

/// Parses the `P:` / `V:` records of the apk installed database
pub struct ApkAnalyzer;

impl PkgAnalyzer for ApkAnalyzer {
    fn name(&self) -> &str {
        "apk"
    }

    fn required_files(&self) -> Vec<FilePattern> {
        vec![FilePattern::exact(APK_INSTALLED)]
    }

    fn analyze(&self, files: &FileMap) -> Result<Vec<Package>, AnalyzerError> {
        let content = files
            .get_str(APK_INSTALLED)
            .ok_or_else(|| AnalyzerError::missing(APK_INSTALLED))?;

        let mut packages = Vec::new();
        let mut name: Option<&str> = None;
        for line in content.lines() {
            if let Some(n) = line.strip_prefix("P:") {
                name = Some(n.trim());
            } else if let Some(v) = line.strip_prefix("V:") {
                let n = name.take().ok_or_else(|| {
                    AnalyzerError::malformed(APK_INSTALLED, anyhow::anyhow!("V: before P:"))
                })?;
                let (version, release) = v.trim().rsplit_once('-').unwrap_or((v.trim(), ""));
                packages.push(Package::new(n, version, release));
            }
        }
        Ok(packages)
    }
}

/// Always succeeds with a fixed OS and counts invocations
pub struct SpyOsAnalyzer {
    os: Os,
    calls: AtomicUsize,
}

impl SpyOsAnalyzer {
    pub fn new(os: Os) -> Self {
        Self {
            os,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OsAnalyzer for SpyOsAnalyzer {
    fn name(&self) -> &str {
        "spy"
    }

    fn required_files(&self) -> Vec<FilePattern> {
        vec![FilePattern::exact("etc/issue")]
    }

    fn analyze(&self, _files: &FileMap) -> Result<Os, AnalyzerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.os.clone())
    }
}
