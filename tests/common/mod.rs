//! Writes `.vox` byte buffers for tests.
#![allow(dead_code)]

pub fn string(s: &str) -> Vec<u8> {
    let mut bytes = (s.len() as u32).to_le_bytes().to_vec();
    bytes.extend(s.as_bytes());
    bytes
}

pub fn dict(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut bytes = (entries.len() as u32).to_le_bytes().to_vec();
    for (key, value) in entries {
        bytes.extend(string(key));
        bytes.extend(string(value));
    }
    bytes
}

pub fn chunk(tag: &[u8; 4], content: &[u8]) -> Vec<u8> {
    let mut bytes = tag.to_vec();
    bytes.extend((content.len() as u32).to_le_bytes());
    bytes.extend(0u32.to_le_bytes());
    bytes.extend(content);
    bytes
}

/// Content of a transform node chunk with a single frame.
pub fn transform_content(id: u32, attributes: &[(&str, &str)], frame: &[(&str, &str)]) -> Vec<u8> {
    let mut bytes = id.to_le_bytes().to_vec();
    bytes.extend(dict(attributes));
    bytes.extend((id + 1).to_le_bytes());
    bytes.extend((-1i32).to_le_bytes());
    bytes.extend(0u32.to_le_bytes());
    bytes.extend(1u32.to_le_bytes());
    bytes.extend(dict(frame));
    bytes
}

pub fn group_content(id: u32, children: &[u32]) -> Vec<u8> {
    let mut bytes = id.to_le_bytes().to_vec();
    bytes.extend(dict(&[]));
    bytes.extend((children.len() as u32).to_le_bytes());
    for child in children {
        bytes.extend(child.to_le_bytes());
    }
    bytes
}

pub fn shape_content(id: u32, model: u32) -> Vec<u8> {
    let mut bytes = id.to_le_bytes().to_vec();
    bytes.extend(dict(&[]));
    bytes.extend(1u32.to_le_bytes());
    bytes.extend(model.to_le_bytes());
    bytes.extend(dict(&[]));
    bytes
}

/// A transform node together with what it leads to.
pub struct Node {
    pub attributes: Vec<(&'static str, &'static str)>,
    pub frame: Vec<(&'static str, &'static str)>,
    pub kind: NodeKind,
}

pub enum NodeKind {
    Shape(u32),
    Group(Vec<Node>),
}

impl Node {
    pub fn shape(model: u32) -> Self {
        Node { attributes: Vec::new(), frame: Vec::new(), kind: NodeKind::Shape(model) }
    }

    pub fn group(children: Vec<Node>) -> Self {
        Node { attributes: Vec::new(), frame: Vec::new(), kind: NodeKind::Group(children) }
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.attributes.push(("_name", name));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.attributes.push(("_hidden", "1"));
        self
    }

    pub fn at(mut self, translation: &'static str) -> Self {
        self.frame.push(("_t", translation));
        self
    }

    pub fn rotated(mut self, rotation: &'static str) -> Self {
        self.frame.push(("_r", rotation));
        self
    }

    fn write(&self, next_id: &mut u32, out: &mut Vec<u8>) {
        let id = *next_id;
        *next_id += 2;
        out.extend(chunk(b"nTRN", &transform_content(id, &self.attributes, &self.frame)));
        match &self.kind {
            NodeKind::Shape(model) => out.extend(chunk(b"nSHP", &shape_content(id + 1, *model))),
            NodeKind::Group(children) => {
                let mut child_ids = Vec::new();
                let mut child_bytes = Vec::new();
                for child in children {
                    child_ids.push(*next_id);
                    child.write(next_id, &mut child_bytes);
                }
                out.extend(chunk(b"nGRP", &group_content(id + 1, &child_ids)));
                out.extend(child_bytes);
            }
        }
    }
}

/// Collects chunks and wraps them in the file header and `MAIN` chunk.
#[derive(Default)]
pub struct VoxWriter {
    children: Vec<u8>,
}

impl VoxWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.children.extend(bytes);
        self
    }

    pub fn chunk(self, tag: &[u8; 4], content: &[u8]) -> Self {
        self.raw(&chunk(tag, content))
    }

    /// A `SIZE` chunk and its `XYZI` chunk; voxels are `[x, y, z, color index]`.
    pub fn model(self, size: [u32; 3], voxels: &[[u8; 4]]) -> Self {
        let size_content: Vec<u8> = size.iter().flat_map(|dim| dim.to_le_bytes()).collect();
        let mut xyzi = (voxels.len() as u32).to_le_bytes().to_vec();
        for voxel in voxels {
            xyzi.extend(voxel);
        }
        self.chunk(b"SIZE", &size_content).chunk(b"XYZI", &xyzi)
    }

    pub fn palette(self, colors: impl Fn(usize) -> u32) -> Self {
        let mut content = Vec::new();
        for i in 0..256 {
            content.extend(colors(i).to_le_bytes());
        }
        self.chunk(b"RGBA", &content)
    }

    pub fn material(self, id: u32, props: &[(&str, &str)]) -> Self {
        let mut content = id.to_le_bytes().to_vec();
        content.extend(dict(props));
        self.chunk(b"MATL", &content)
    }

    /// The root transform and group, followed by `children` depth first.
    pub fn scene(mut self, children: Vec<Node>) -> Self {
        let mut next_id = 2;
        let mut child_ids = Vec::new();
        let mut child_bytes = Vec::new();
        for child in &children {
            child_ids.push(next_id);
            child.write(&mut next_id, &mut child_bytes);
        }
        self.children.extend(chunk(b"nTRN", &transform_content(0, &[], &[])));
        self.children.extend(chunk(b"nGRP", &group_content(1, &child_ids)));
        self.children.extend(child_bytes);
        self
    }

    pub fn build_version(self, version: u32) -> Vec<u8> {
        let mut bytes = b"VOX ".to_vec();
        bytes.extend(version.to_le_bytes());
        bytes.extend(b"MAIN");
        bytes.extend(0u32.to_le_bytes());
        bytes.extend((self.children.len() as u32).to_le_bytes());
        bytes.extend(self.children);
        bytes
    }

    pub fn build(self) -> Vec<u8> {
        self.build_version(200)
    }
}
