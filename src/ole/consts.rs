//! Compound file format constants.

/// Magic bytes that should be at the beginning of every compound file
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Minimal size of an empty compound file with 512-byte sectors (1536 bytes)
pub const MINIMAL_OLEFILE_SIZE: usize = 1536;

/// Size of the compound file header in bytes
pub const HEADER_SIZE: usize = 512;

/// Size of a directory entry in bytes
pub const DIRENTRY_SIZE: usize = 128;

/// Number of FAT sector ids stored directly in the header
pub const HEADER_DIFAT_ENTRIES: usize = 109;

// Special sector ids in the FAT
/// FAT entry of a sector holding the FAT itself
pub const FATSECT: u32 = 0xFFFF_FFFD;
/// Last sector of a chain
pub const ENDOFCHAIN: u32 = 0xFFFF_FFFE;
/// Unallocated sector
pub const FREESECT: u32 = 0xFFFF_FFFF;

/// Absent sibling or child in the directory tree
pub const NOSTREAM: u32 = 0xFFFF_FFFF;

// Directory entry object types
/// Empty directory entry
pub const STGTY_EMPTY: u8 = 0;
/// Element is a storage object
pub const STGTY_STORAGE: u8 = 1;
/// Element is a stream object
pub const STGTY_STREAM: u8 = 2;
/// Element is a root storage
pub const STGTY_ROOT: u8 = 5;

// Property value types of the summary property set
pub const VT_EMPTY: u16 = 0;
pub const VT_NULL: u16 = 1;
pub const VT_I2: u16 = 2;
pub const VT_I4: u16 = 3;
pub const VT_BSTR: u16 = 8;
pub const VT_BOOL: u16 = 11;
pub const VT_UI2: u16 = 18;
pub const VT_UI4: u16 = 19;
pub const VT_LPSTR: u16 = 30;
pub const VT_LPWSTR: u16 = 31;
pub const VT_FILETIME: u16 = 64;
