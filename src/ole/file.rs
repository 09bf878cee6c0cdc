use super::consts::*;
use std::io::{self, Read, Seek, SeekFrom};
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw compound file header (512 bytes)
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawHeader {
    magic: [u8; 8],
    clsid: [u8; 16],
    minor_version: U16<LE>,
    dll_version: U16<LE>,
    byte_order: U16<LE>,
    sector_shift: U16<LE>,
    mini_sector_shift: U16<LE>,
    reserved: [u8; 6],
    num_dir_sectors: U32<LE>,
    num_fat_sectors: U32<LE>,
    first_dir_sector: U32<LE>,
    transaction_signature: U32<LE>,
    mini_stream_cutoff: U32<LE>,
    first_minifat_sector: U32<LE>,
    num_minifat_sectors: U32<LE>,
    first_difat_sector: U32<LE>,
    num_difat_sectors: U32<LE>,
    /// First 109 FAT sector ids
    difat: [U32<LE>; HEADER_DIFAT_ENTRIES],
}

/// Raw directory entry structure (128 bytes)
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of name in bytes (including null terminator)
    name_len: U16<LE>,
    entry_type: u8,
    node_color: u8,
    sid_left: U32<LE>,
    sid_right: U32<LE>,
    sid_child: U32<LE>,
    clsid: [u8; 16],
    state_bits: U32<LE>,
    creation_time: U64<LE>,
    modified_time: U64<LE>,
    start_sector: U32<LE>,
    stream_size: U64<LE>,
}

/// Compound file reader
///
/// HWP 5.0 documents are stored in a compound file. The reader loads the
/// allocation tables and directory eagerly and reads streams on request.
#[derive(Debug)]
pub struct OleFile<R: Read + Seek> {
    reader: R,
    file_size: u64,
    sector_size: usize,
    mini_sector_size: usize,
    mini_stream_cutoff: u32,
    fat: Vec<u32>,
    minifat: Vec<u32>,
    /// All directory entries indexed by SID (`None` for unused slots)
    entries: Vec<Option<DirectoryEntry>>,
    /// Mini stream data (loaded on first small-stream read)
    ministream: Option<Vec<u8>>,
}

/// A stream or storage in the compound file directory
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub sid: u32,
    pub name: String,
    pub entry_type: u8,
    pub sid_left: u32,
    pub sid_right: u32,
    pub sid_child: u32,
    pub start_sector: u32,
    pub size: u64,
}

impl DirectoryEntry {
    #[inline]
    pub fn is_stream(&self) -> bool {
        self.entry_type == STGTY_STREAM
    }

    #[inline]
    pub fn is_storage(&self) -> bool {
        self.entry_type == STGTY_STORAGE || self.entry_type == STGTY_ROOT
    }
}

/// Error types for compound file parsing
#[derive(Debug)]
pub enum OleError {
    Io(io::Error),
    InvalidFormat(String),
    InvalidData(String),
    NotOleFile,
    CorruptedFile(String),
    StreamNotFound(String),
}

impl From<io::Error> for OleError {
    fn from(err: io::Error) -> Self {
        OleError::Io(err)
    }
}

impl std::fmt::Display for OleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OleError::Io(e) => write!(f, "IO error: {}", e),
            OleError::InvalidFormat(s) => write!(f, "Invalid format: {}", s),
            OleError::InvalidData(s) => write!(f, "Invalid data: {}", s),
            OleError::NotOleFile => write!(f, "Not a compound file"),
            OleError::CorruptedFile(s) => write!(f, "Corrupted file: {}", s),
            OleError::StreamNotFound(s) => write!(f, "Stream not found: {}", s),
        }
    }
}

impl std::error::Error for OleError {}

impl<R: Read + Seek> OleFile<R> {
    /// Open and parse a compound file from a reader
    ///
    /// # Arguments
    /// * `reader` - A reader that implements Read + Seek
    ///
    /// # Returns
    /// * `Result<OleFile<R>, OleError>` - The parsed file or an error. A file
    ///   whose sectors run past the end of the input fails with
    ///   `OleError::Io(UnexpectedEof)` or `OleError::CorruptedFile`.
    pub fn open(mut reader: R) -> Result<Self, OleError> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        if file_size < MINIMAL_OLEFILE_SIZE as u64 {
            return Err(OleError::NotOleFile);
        }

        let mut header_bytes = [0u8; HEADER_SIZE];
        reader.read_exact(&mut header_bytes)?;
        let header = RawHeader::read_from_bytes(&header_bytes[..])
            .map_err(|_| OleError::InvalidFormat("Failed to parse header".to_string()))?;

        if &header.magic != MAGIC {
            return Err(OleError::NotOleFile);
        }
        if header.byte_order.get() != 0xFFFE {
            return Err(OleError::InvalidFormat("Invalid byte order".to_string()));
        }

        let sector_shift = header.sector_shift.get();
        let mini_sector_shift = header.mini_sector_shift.get();
        if !(7..=16).contains(&sector_shift) || mini_sector_shift > sector_shift {
            return Err(OleError::InvalidFormat(format!(
                "Unsupported sector shift {}",
                sector_shift
            )));
        }

        let sector_size = 1usize << sector_shift;
        let dll_version = header.dll_version.get();
        if (dll_version == 3 && sector_size != 512) || (dll_version == 4 && sector_size != 4096) {
            return Err(OleError::InvalidFormat("Sector size mismatch".to_string()));
        }

        let mut ole = OleFile {
            reader,
            file_size,
            sector_size,
            mini_sector_size: 1usize << mini_sector_shift,
            mini_stream_cutoff: header.mini_stream_cutoff.get(),
            fat: Vec::new(),
            minifat: Vec::new(),
            entries: Vec::new(),
            ministream: None,
        };

        ole.load_fat(&header)?;
        ole.load_directory(header.first_dir_sector.get())?;
        if header.num_minifat_sectors.get() > 0 {
            ole.load_minifat(header.first_minifat_sector.get())?;
        }

        log::trace!(
            "compound file opened: {} bytes, {} fat entries, {} directory entries",
            ole.file_size,
            ole.fat.len(),
            ole.entries.len()
        );

        Ok(ole)
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Load the File Allocation Table from the header DIFAT and any DIFAT
    /// sectors chained after it.
    fn load_fat(&mut self, header: &RawHeader) -> Result<(), OleError> {
        let mut fat_sectors: Vec<u32> = header
            .difat
            .iter()
            .map(|v| v.get())
            .take_while(|&s| s != FREESECT && s != ENDOFCHAIN)
            .collect();

        let ids_per_sector = self.sector_size / 4 - 1;
        let mut difat_sector = header.first_difat_sector.get();
        for _ in 0..header.num_difat_sectors.get() {
            if difat_sector == ENDOFCHAIN || difat_sector == FREESECT {
                break;
            }
            let data = self.read_sector(difat_sector)?;
            for chunk in data.chunks_exact(4).take(ids_per_sector) {
                let id = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                if id == FREESECT || id == ENDOFCHAIN {
                    break;
                }
                fat_sectors.push(id);
            }
            let next = ids_per_sector * 4;
            difat_sector =
                u32::from_le_bytes([data[next], data[next + 1], data[next + 2], data[next + 3]]);
        }

        if fat_sectors.len() != header.num_fat_sectors.get() as usize {
            log::debug!(
                "header declares {} FAT sectors, found {}",
                header.num_fat_sectors.get(),
                fat_sectors.len()
            );
        }

        self.fat.reserve(fat_sectors.len() * self.sector_size / 4);
        for sector_id in fat_sectors {
            let data = self.read_sector(sector_id)?;
            self.fat.extend(
                data.chunks_exact(4)
                    .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]])),
            );
        }

        Ok(())
    }

    fn load_minifat(&mut self, first_sector: u32) -> Result<(), OleError> {
        let data = self.read_chain(first_sector)?;
        self.minifat = data
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(())
    }

    fn load_directory(&mut self, first_sector: u32) -> Result<(), OleError> {
        let data = self.read_chain(first_sector)?;
        let count = data.len() / DIRENTRY_SIZE;
        if count == 0 {
            return Err(OleError::CorruptedFile("Empty directory".to_string()));
        }

        self.entries = Vec::with_capacity(count);
        for (sid, raw) in data.chunks_exact(DIRENTRY_SIZE).enumerate() {
            self.entries.push(self.parse_directory_entry(raw, sid as u32)?);
        }

        match self.entries.first() {
            Some(Some(root)) if root.entry_type == STGTY_ROOT => Ok(()),
            _ => Err(OleError::CorruptedFile("Missing root entry".to_string())),
        }
    }

    fn parse_directory_entry(
        &self,
        data: &[u8],
        sid: u32,
    ) -> Result<Option<DirectoryEntry>, OleError> {
        let raw = RawDirectoryEntry::read_from_bytes(data)
            .map_err(|_| OleError::InvalidFormat("Failed to parse directory entry".to_string()))?;

        if raw.entry_type == STGTY_EMPTY {
            return Ok(None);
        }

        let name_len = (raw.name_len.get() as usize).min(64);
        let units: Vec<u16> = raw.name[..name_len.saturating_sub(2)]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        let name = String::from_utf16_lossy(&units);

        // 512-byte sector files only use the low 32 bits of the size
        let size = if self.sector_size == 512 {
            raw.stream_size.get() & 0xFFFF_FFFF
        } else {
            raw.stream_size.get()
        };

        Ok(Some(DirectoryEntry {
            sid,
            name,
            entry_type: raw.entry_type,
            sid_left: raw.sid_left.get(),
            sid_right: raw.sid_right.get(),
            sid_child: raw.sid_child.get(),
            start_sector: raw.start_sector.get(),
            size,
        }))
    }

    fn read_sector(&mut self, sector_id: u32) -> Result<Vec<u8>, OleError> {
        let position = (sector_id as u64 + 1) * self.sector_size as u64;
        if position + self.sector_size as u64 > self.file_size {
            return Err(OleError::CorruptedFile(format!(
                "Sector {} lies beyond end of file",
                sector_id
            )));
        }
        self.reader.seek(SeekFrom::Start(position))?;
        let mut buffer = vec![0u8; self.sector_size];
        self.reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Read a full sector chain by following the FAT.
    fn read_chain(&mut self, start_sector: u32) -> Result<Vec<u8>, OleError> {
        let mut data = Vec::new();
        let mut sector = start_sector;
        let mut steps = 0usize;

        while sector != ENDOFCHAIN {
            if sector as usize >= self.fat.len() {
                return Err(OleError::CorruptedFile(format!(
                    "Sector index {} outside FAT",
                    sector
                )));
            }
            steps += 1;
            if steps > self.fat.len() {
                return Err(OleError::CorruptedFile("Cycle in FAT chain".to_string()));
            }
            data.extend_from_slice(&self.read_sector(sector)?);
            sector = self.fat[sector as usize];
        }

        Ok(data)
    }

    fn read_mini_chain(&mut self, start_sector: u32, size: u64) -> Result<Vec<u8>, OleError> {
        if self.ministream.is_none() {
            let root_start = match self.entries.first() {
                Some(Some(root)) => root.start_sector,
                _ => return Err(OleError::CorruptedFile("No root entry".to_string())),
            };
            self.ministream = Some(self.read_chain(root_start)?);
        }

        let ministream = self.ministream.as_deref().unwrap_or_default();
        let mut data = Vec::with_capacity(size as usize);
        let mut sector = start_sector;
        let mut steps = 0usize;

        while sector != ENDOFCHAIN && (data.len() as u64) < size {
            if sector as usize >= self.minifat.len() {
                return Err(OleError::CorruptedFile(format!(
                    "Sector index {} outside MiniFAT",
                    sector
                )));
            }
            steps += 1;
            if steps > self.minifat.len() {
                return Err(OleError::CorruptedFile("Cycle in MiniFAT chain".to_string()));
            }
            let position = sector as usize * self.mini_sector_size;
            let end = position + self.mini_sector_size;
            if end > ministream.len() {
                return Err(OleError::CorruptedFile("Mini sector out of bounds".to_string()));
            }
            data.extend_from_slice(&ministream[position..end]);
            sector = self.minifat[sector as usize];
        }

        data.truncate(size as usize);
        Ok(data)
    }

    /// Open a stream by path and return its contents
    ///
    /// # Arguments
    /// * `path` - Storage names followed by the stream name, e.g.
    ///   `&["BodyText", "Section0"]`. Matching is case-insensitive.
    pub fn open_stream(&mut self, path: &[&str]) -> Result<Vec<u8>, OleError> {
        let entry = self.find_entry(path)?;
        if !entry.is_stream() {
            return Err(OleError::InvalidFormat(format!(
                "'{}' is not a stream",
                path.join("/")
            )));
        }

        let data = if entry.size < self.mini_stream_cutoff as u64 {
            self.read_mini_chain(entry.start_sector, entry.size)?
        } else {
            let mut data = self.read_chain(entry.start_sector)?;
            data.truncate(entry.size as usize);
            data
        };

        if (data.len() as u64) < entry.size {
            return Err(OleError::CorruptedFile(format!(
                "Stream '{}' is shorter than its declared size",
                path.join("/")
            )));
        }

        Ok(data)
    }

    /// Check if a stream or storage exists
    pub fn exists(&self, path: &[&str]) -> bool {
        self.find_entry(path).is_ok()
    }

    /// List the direct children of a storage in directory order
    ///
    /// # Arguments
    /// * `path` - Path to the storage (empty for the root)
    pub fn list_children(&self, path: &[&str]) -> Result<Vec<DirectoryEntry>, OleError> {
        let storage = self.find_entry(path)?;
        if !storage.is_storage() {
            return Err(OleError::InvalidFormat(format!(
                "'{}' is not a storage",
                path.join("/")
            )));
        }
        let mut children = Vec::new();
        let mut visited = vec![false; self.entries.len()];
        self.collect_tree(storage.sid_child, &mut visited, &mut children);
        Ok(children)
    }

    /// List all stream paths in the file
    pub fn list_streams(&self) -> Vec<Vec<String>> {
        let mut streams = Vec::new();
        let mut visited = vec![false; self.entries.len()];
        if let Some(Some(root)) = self.entries.first() {
            self.collect_streams(root.sid_child, &mut Vec::new(), &mut visited, &mut streams);
        }
        streams
    }

    /// In-order walk of one sibling tree.
    fn collect_tree(&self, sid: u32, visited: &mut [bool], out: &mut Vec<DirectoryEntry>) {
        let Some(entry) = self.entry(sid) else {
            return;
        };
        if std::mem::replace(&mut visited[sid as usize], true) {
            return;
        }
        self.collect_tree(entry.sid_left, visited, out);
        out.push(entry.clone());
        self.collect_tree(entry.sid_right, visited, out);
    }

    fn collect_streams(
        &self,
        sid: u32,
        path: &mut Vec<String>,
        visited: &mut [bool],
        streams: &mut Vec<Vec<String>>,
    ) {
        let mut siblings = Vec::new();
        self.collect_tree(sid, visited, &mut siblings);
        for entry in siblings {
            path.push(entry.name.clone());
            if entry.is_stream() {
                streams.push(path.clone());
            } else if entry.is_storage() {
                self.collect_streams(entry.sid_child, path, visited, streams);
            }
            path.pop();
        }
    }

    #[inline]
    fn entry(&self, sid: u32) -> Option<&DirectoryEntry> {
        if sid == NOSTREAM {
            return None;
        }
        self.entries.get(sid as usize).and_then(|e| e.as_ref())
    }

    fn find_entry(&self, path: &[&str]) -> Result<DirectoryEntry, OleError> {
        let mut current = match self.entries.first() {
            Some(Some(root)) => root.clone(),
            _ => return Err(OleError::StreamNotFound("<root>".to_string())),
        };

        for &name in path {
            let mut visited = vec![false; self.entries.len()];
            current = self
                .find_child_by_name(current.sid_child, name, &mut visited)
                .ok_or_else(|| OleError::StreamNotFound(path.join("/")))?;
        }

        Ok(current)
    }

    fn find_child_by_name(
        &self,
        sid: u32,
        name: &str,
        visited: &mut [bool],
    ) -> Option<DirectoryEntry> {
        let entry = self.entry(sid)?;
        if std::mem::replace(&mut visited[sid as usize], true) {
            return None;
        }
        if entry.name.eq_ignore_ascii_case(name) {
            return Some(entry.clone());
        }
        self.find_child_by_name(entry.sid_left, name, visited)
            .or_else(|| self.find_child_by_name(entry.sid_right, name, visited))
    }
}

/// Check if data starts with the compound file signature
pub fn is_ole_file(data: &[u8]) -> bool {
    data.len() >= MINIMAL_OLEFILE_SIZE && &data[0..8] == MAGIC
}
