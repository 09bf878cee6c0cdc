//! Minimal compound file writer used to build HWP 5.0 fixtures in tests.
//!
//! Every stream is stored in regular 512-byte sectors (mini stream cutoff of
//! zero), and siblings are linked as a right-leaning chain. Readers do not
//! depend on red-black balancing, so this is enough to exercise lookup.

use super::consts::*;

struct Node {
    name: String,
    entry_type: u8,
    children: Vec<usize>,
    data: Vec<u8>,
}

/// Builds an in-memory compound file from stream paths.
pub(crate) struct CompoundFileBuilder {
    nodes: Vec<Node>,
}

const SECTOR: usize = 512;
const IDS_PER_SECTOR: usize = SECTOR / 4;

impl CompoundFileBuilder {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node {
                name: "Root Entry".to_string(),
                entry_type: STGTY_ROOT,
                children: Vec::new(),
                data: Vec::new(),
            }],
        }
    }

    /// Add a stream, creating intermediate storages as needed.
    pub(crate) fn add_stream(&mut self, path: &[&str], data: &[u8]) -> &mut Self {
        let mut parent = 0;
        for (i, name) in path.iter().enumerate() {
            let is_leaf = i + 1 == path.len();
            let existing = self.nodes[parent]
                .children
                .iter()
                .copied()
                .find(|&c| self.nodes[c].name == *name);
            parent = match existing {
                Some(idx) => idx,
                None => {
                    let idx = self.nodes.len();
                    self.nodes.push(Node {
                        name: name.to_string(),
                        entry_type: if is_leaf { STGTY_STREAM } else { STGTY_STORAGE },
                        children: Vec::new(),
                        data: Vec::new(),
                    });
                    self.nodes[parent].children.push(idx);
                    idx
                },
            };
            if is_leaf {
                self.nodes[parent].data = data.to_vec();
            }
        }
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let sectors_for = |len: usize| len.div_ceil(SECTOR);

        let dir_sectors = sectors_for(self.nodes.len() * DIRENTRY_SIZE);
        let data_sectors: usize = self.nodes.iter().map(|n| sectors_for(n.data.len())).sum();

        let mut fat_sectors = 1;
        while fat_sectors * IDS_PER_SECTOR < fat_sectors + dir_sectors + data_sectors {
            fat_sectors += 1;
        }
        assert!(fat_sectors <= HEADER_DIFAT_ENTRIES, "fixture too large");

        let mut fat = vec![FREESECT; fat_sectors * IDS_PER_SECTOR];
        for entry in fat.iter_mut().take(fat_sectors) {
            *entry = FATSECT;
        }
        let mut next = fat_sectors;
        let mut chain = |fat: &mut Vec<u32>, count: usize| -> u32 {
            if count == 0 {
                return ENDOFCHAIN;
            }
            let start = next;
            for i in 0..count {
                fat[start + i] = if i + 1 == count {
                    ENDOFCHAIN
                } else {
                    (start + i + 1) as u32
                };
            }
            next += count;
            start as u32
        };

        let dir_start = chain(&mut fat, dir_sectors);
        let starts: Vec<u32> = self
            .nodes
            .iter()
            .map(|n| chain(&mut fat, sectors_for(n.data.len())))
            .collect();

        // Header
        let mut out = Vec::with_capacity(SECTOR * (1 + fat_sectors + dir_sectors + data_sectors));
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&[0u8; 16]);
        out.extend_from_slice(&0x003Eu16.to_le_bytes());
        out.extend_from_slice(&3u16.to_le_bytes());
        out.extend_from_slice(&0xFFFEu16.to_le_bytes());
        out.extend_from_slice(&9u16.to_le_bytes());
        out.extend_from_slice(&6u16.to_le_bytes());
        out.extend_from_slice(&[0u8; 6]);
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(fat_sectors as u32).to_le_bytes());
        out.extend_from_slice(&dir_start.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // mini stream cutoff
        out.extend_from_slice(&ENDOFCHAIN.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&ENDOFCHAIN.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        for i in 0..HEADER_DIFAT_ENTRIES {
            let id = if i < fat_sectors { i as u32 } else { FREESECT };
            out.extend_from_slice(&id.to_le_bytes());
        }
        debug_assert_eq!(out.len(), SECTOR);

        for id in &fat {
            out.extend_from_slice(&id.to_le_bytes());
        }

        // Directory
        let mut dir = Vec::with_capacity(dir_sectors * SECTOR);
        for (sid, node) in self.nodes.iter().enumerate() {
            dir.extend_from_slice(&self.directory_entry(sid, node, starts[sid]));
        }
        while dir.len() < dir_sectors * SECTOR {
            let mut empty = [0u8; DIRENTRY_SIZE];
            empty[68..80].copy_from_slice(&[0xFF; 12]);
            dir.extend_from_slice(&empty);
        }
        out.extend_from_slice(&dir);

        // Stream data
        for node in &self.nodes {
            if node.data.is_empty() {
                continue;
            }
            out.extend_from_slice(&node.data);
            let padding = sectors_for(node.data.len()) * SECTOR - node.data.len();
            out.extend(std::iter::repeat_n(0u8, padding));
        }

        out
    }

    fn directory_entry(&self, sid: usize, node: &Node, start: u32) -> [u8; DIRENTRY_SIZE] {
        let mut entry = [0u8; DIRENTRY_SIZE];
        let units: Vec<u16> = node.name.encode_utf16().take(31).collect();
        for (i, u) in units.iter().enumerate() {
            entry[i * 2..i * 2 + 2].copy_from_slice(&u.to_le_bytes());
        }
        entry[64..66].copy_from_slice(&(((units.len() + 1) * 2) as u16).to_le_bytes());
        entry[66] = node.entry_type;
        entry[67] = 1;

        let right = self
            .nodes
            .iter()
            .find_map(|p| {
                let pos = p.children.iter().position(|&c| c == sid)?;
                Some(p.children.get(pos + 1).map_or(NOSTREAM, |&c| c as u32))
            })
            .unwrap_or(NOSTREAM);
        let child = node.children.first().map_or(NOSTREAM, |&c| c as u32);

        entry[68..72].copy_from_slice(&NOSTREAM.to_le_bytes());
        entry[72..76].copy_from_slice(&right.to_le_bytes());
        entry[76..80].copy_from_slice(&child.to_le_bytes());
        entry[116..120].copy_from_slice(&start.to_le_bytes());
        entry[120..128].copy_from_slice(&(node.data.len() as u64).to_le_bytes());
        entry
    }
}

/// Build a single-section property set from `(id, type, payload)` triples.
pub(crate) fn property_set(props: &[(u32, u16, Vec<u8>)]) -> Vec<u8> {
    let mut data = vec![0u8; 48];
    data[44..48].copy_from_slice(&48u32.to_le_bytes());

    let header_len = 8 + props.len() * 8;
    let mut values = Vec::new();
    let mut table = Vec::new();
    for (id, ty, payload) in props {
        table.extend_from_slice(&id.to_le_bytes());
        table.extend_from_slice(&((header_len + values.len()) as u32).to_le_bytes());
        values.extend_from_slice(&(*ty as u32).to_le_bytes());
        values.extend_from_slice(payload);
    }

    data.extend_from_slice(&((header_len + values.len()) as u32).to_le_bytes());
    data.extend_from_slice(&(props.len() as u32).to_le_bytes());
    data.extend_from_slice(&table);
    data.extend_from_slice(&values);
    data
}

/// Encode a `VT_LPWSTR` payload.
pub(crate) fn lpwstr(s: &str) -> Vec<u8> {
    let units: Vec<u16> = s.encode_utf16().chain(std::iter::once(0)).collect();
    let mut out = (units.len() as u32).to_le_bytes().to_vec();
    for u in units {
        out.extend_from_slice(&u.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ole::OleFile;
    use std::io::Cursor;

    #[test]
    fn test_round_trip_through_reader() {
        let big = vec![0x5Au8; 1300];
        let bytes = CompoundFileBuilder::new()
            .add_stream(&["FileHeader"], b"header")
            .add_stream(&["BodyText", "Section0"], &big)
            .add_stream(&["BodyText", "Section1"], b"")
            .build();

        let mut ole = OleFile::open(Cursor::new(bytes)).unwrap();
        assert_eq!(ole.open_stream(&["FileHeader"]).unwrap(), b"header");
        assert_eq!(ole.open_stream(&["bodytext", "section0"]).unwrap(), big);
        assert!(ole.open_stream(&["BodyText", "Section1"]).unwrap().is_empty());

        let names: Vec<String> = ole
            .list_children(&["BodyText"])
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Section0", "Section1"]);

        let streams = ole.list_streams();
        assert_eq!(streams.len(), 3);
        assert!(streams.contains(&vec!["BodyText".to_string(), "Section0".to_string()]));
    }

    #[test]
    fn test_missing_stream() {
        let bytes = CompoundFileBuilder::new()
            .add_stream(&["FileHeader"], b"x")
            .build();
        let mut ole = OleFile::open(Cursor::new(bytes)).unwrap();
        assert!(!ole.exists(&["DocInfo"]));
        assert!(ole.open_stream(&["DocInfo"]).is_err());
    }

    #[test]
    fn test_truncated_file_fails() {
        let bytes = CompoundFileBuilder::new()
            .add_stream(&["FileHeader"], &[1u8; 4000])
            .build();
        let truncated = bytes[..bytes.len() - 1024].to_vec();
        let result = OleFile::open(Cursor::new(truncated)).and_then(|mut ole| {
            ole.open_stream(&["FileHeader"])
        });
        assert!(result.is_err());
    }
}

