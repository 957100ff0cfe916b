//! Sources of the raw board revision integer.
//!
//! Every source reports 0 when it can't produce a revision. 0 is a reserved legacy code, so the
//! codec turns it into `BoardError::UnknownBoard`.
use byteorder::{BigEndian, ReadBytesExt};
use log::{debug, warn};
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Something that can report the raw revision integer of the board.
///
/// Production code uses `SystemReader`. Tests can hand `BoardInfo::from_reader` or `set_reader` any
/// closure returning a `u32`.
pub trait RevisionSource {
    /// Raw revision integer, or 0 when none could be read.
    fn read_revision(&self) -> u32;
}

impl<F> RevisionSource for F
where
    F: Fn() -> u32,
{
    fn read_revision(&self) -> u32 {
        self()
    }
}

fn open_read_only(path: &Path) -> nix::Result<File> {
    use std::os::unix::io::FromRawFd;

    let mut open_flags = OFlag::empty();
    open_flags.insert(OFlag::O_RDONLY);
    open_flags.insert(OFlag::O_CLOEXEC);

    let fd = open(path, open_flags, Mode::empty())?;

    // SAFETY: Validity of fd is checked by Nix and nothing else owns it.
    Ok(unsafe { File::from_raw_fd(fd) })
}

/// Reads the `Revision` line of `/proc/cpuinfo`.
#[derive(Clone, Debug)]
pub struct CpuInfoReader {
    path: PathBuf,
}

impl CpuInfoReader {
    pub const PATH: &'static str = "/proc/cpuinfo";

    pub fn new() -> Self {
        Self::with_path(Self::PATH)
    }

    /// Reads a file laid out like `/proc/cpuinfo` from somewhere else.
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for CpuInfoReader {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionSource for CpuInfoReader {
    fn read_revision(&self) -> u32 {
        let file = match open_read_only(&self.path) {
            Ok(file) => file,
            Err(err) => {
                warn!("can't open {}: {}", self.path.display(), err);
                return 0;
            }
        };

        let revision = parse_cpuinfo(BufReader::new(file));
        if revision == 0 {
            warn!("no usable Revision line in {}", self.path.display());
        } else {
            debug!("{} reports revision {:#x}", self.path.display(), revision);
        }

        revision
    }
}

/// Value of the first `Revision` line, or 0 if there is none.
///
/// Lines that are not valid UTF-8 are read lossily, so a garbled line doesn't hide the ones after it.
/// A read error ends the scan like end of file does.
pub(crate) fn parse_cpuinfo<R: BufRead>(reader: R) -> u32 {
    for line in reader.split(b'\n') {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };

        if let Some(revision) = parse_revision_line(&String::from_utf8_lossy(&line)) {
            return revision;
        }
    }

    0
}

/// Parses `Revision\t: a01041`. `None` when the line has another label, `Some(0)` when the
/// `Revision` line carries no digits.
fn parse_revision_line(line: &str) -> Option<u32> {
    let label = line.split(|c: char| c.is_ascii_whitespace()).next()?;
    if label != "Revision" {
        return None;
    }

    // The kernel prints the revision as hexadecimal, padded with a tab and a colon.
    let value = line[label.len()..].trim_start_matches(|c: char| !c.is_ascii_hexdigit());
    let digits_end = value
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or_else(|| value.len());

    Some(u32::from_str_radix(&value[..digits_end], 16).unwrap_or(0))
}

/// Reads the revision cell the firmware stores in the device tree.
///
/// Kernels that no longer print `Revision` in `/proc/cpuinfo` (arm64 in particular) still export it
/// here, as a single big-endian 32-bit cell.
#[derive(Clone, Debug)]
pub struct DeviceTreeReader {
    path: PathBuf,
}

impl DeviceTreeReader {
    pub const PATH: &'static str = "/proc/device-tree/system/linux,revision";

    pub fn new() -> Self {
        Self::with_path(Self::PATH)
    }

    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for DeviceTreeReader {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionSource for DeviceTreeReader {
    fn read_revision(&self) -> u32 {
        let mut file = match open_read_only(&self.path) {
            Ok(file) => file,
            Err(err) => {
                warn!("can't open {}: {}", self.path.display(), err);
                return 0;
            }
        };

        match file.read_u32::<BigEndian>() {
            Ok(revision) => {
                debug!("{} reports revision {:#x}", self.path.display(), revision);
                revision
            }
            Err(err) => {
                warn!("can't read revision cell from {}: {}", self.path.display(), err);
                0
            }
        }
    }
}

/// Default source: `/proc/cpuinfo`, then the device tree when cpuinfo has no revision.
#[derive(Clone, Debug, Default)]
pub struct SystemReader {
    cpuinfo: CpuInfoReader,
    device_tree: DeviceTreeReader,
}

impl SystemReader {
    pub fn new(cpuinfo: CpuInfoReader, device_tree: DeviceTreeReader) -> Self {
        Self {
            cpuinfo,
            device_tree,
        }
    }
}

impl RevisionSource for SystemReader {
    fn read_revision(&self) -> u32 {
        match self.cpuinfo.read_revision() {
            0 => {
                debug!("falling back to {}", self.device_tree.path().display());
                self.device_tree.read_revision()
            }
            revision => revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const PI2_CPUINFO: &str = "processor\t: 0\n\
        model name\t: ARMv7 Processor rev 5 (v7l)\n\
        BogoMIPS\t: 38.40\n\
        Features\t: half thumb fastmult vfp edsp neon vfpv3 tls vfpv4 idiva idivt vfpd32 lpae evtstrm\n\
        CPU implementer\t: 0x41\n\
        CPU revision\t: 5\n\
        \n\
        Hardware\t: BCM2709\n\
        Revision\t: a01041\n\
        Serial\t\t: 00000000d3d5e4a1\n";

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn file_with(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn finds_revision_among_other_lines() {
        assert_eq!(parse_cpuinfo(Cursor::new(PI2_CPUINFO)), 0xa0_1041);
    }

    #[test]
    fn parses_legacy_and_overvolted_codes() {
        assert_eq!(parse_cpuinfo(Cursor::new("Revision\t: 000e\n")), 0x0e);
        assert_eq!(parse_cpuinfo(Cursor::new("Revision\t: 1000002\n")), 0x100_0002);
        assert_eq!(parse_cpuinfo(Cursor::new("Revision   :::  0010")), 0x10);
    }

    #[test]
    fn missing_or_empty_revision_reads_as_zero() {
        assert_eq!(parse_cpuinfo(Cursor::new("")), 0);
        assert_eq!(parse_cpuinfo(Cursor::new("Hardware\t: BCM2835\n")), 0);
        assert_eq!(parse_cpuinfo(Cursor::new("Revision\t:\nRevision\t: 000e\n")), 0);
        assert_eq!(parse_cpuinfo(Cursor::new("Revision\t: ffffffffff\n")), 0);
    }

    #[test]
    fn label_must_match_exactly() {
        let text = "CPU revision\t: 5\nRevisions : 7\nRevision\t: 0004\n";
        assert_eq!(parse_cpuinfo(Cursor::new(text)), 0x04);
    }

    #[test]
    fn skips_lines_that_are_not_utf8() {
        let text: &[u8] = b"model name\t: \xff\xfe\nRevision\t: 000e\r\n";
        assert_eq!(parse_cpuinfo(Cursor::new(text)), 0x0e);

        let file = file_with(text);
        assert_eq!(CpuInfoReader::with_path(file.path()).read_revision(), 0x0e);
    }

    #[test]
    fn cpuinfo_reader_reads_file() {
        init_logger();
        let file = file_with(PI2_CPUINFO.as_bytes());

        assert_eq!(CpuInfoReader::with_path(file.path()).read_revision(), 0xa0_1041);
    }

    #[test]
    fn cpuinfo_reader_reports_zero_for_missing_file() {
        init_logger();
        let dir = tempfile::tempdir().unwrap();

        let reader = CpuInfoReader::with_path(dir.path().join("cpuinfo"));
        assert_eq!(reader.read_revision(), 0);
    }

    #[test]
    fn device_tree_reader_decodes_big_endian_cell() {
        init_logger();
        let file = file_with(&[0x00, 0xa0, 0x20, 0x82]);

        assert_eq!(DeviceTreeReader::with_path(file.path()).read_revision(), 0xa0_2082);
    }

    #[test]
    fn device_tree_reader_rejects_short_cell() {
        init_logger();
        let file = file_with(&[0xa0, 0x20]);

        assert_eq!(DeviceTreeReader::with_path(file.path()).read_revision(), 0);
    }

    #[test]
    fn system_reader_prefers_cpuinfo() {
        init_logger();
        let cpuinfo = file_with(b"Revision\t: 000e\n");
        let device_tree = file_with(&[0x00, 0xa0, 0x20, 0x82]);

        let reader = SystemReader::new(
            CpuInfoReader::with_path(cpuinfo.path()),
            DeviceTreeReader::with_path(device_tree.path()),
        );
        assert_eq!(reader.read_revision(), 0x0e);
    }

    #[test]
    fn system_reader_falls_back_to_device_tree() {
        init_logger();
        let cpuinfo = file_with(b"Hardware\t: BCM2835\n");
        let device_tree = file_with(&[0x00, 0xa0, 0x20, 0x82]);

        let reader = SystemReader::new(
            CpuInfoReader::with_path(cpuinfo.path()),
            DeviceTreeReader::with_path(device_tree.path()),
        );
        assert_eq!(reader.read_revision(), 0xa0_2082);
    }

    #[test]
    fn closures_are_revision_sources() {
        let source = || 0x10_u32;
        assert_eq!(source.read_revision(), 0x10);
    }
}
