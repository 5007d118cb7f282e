//! Hello extension container.
//!
//! Extensions only appear in ClientHello and ServerHello. Types the client
//! does not know are kept as opaque bytes and otherwise ignored.

use crate::error::{Error, Result};
use crate::handshake_io::Reader;
use crate::protocol::ExtensionType;

/// A single extension: 2-byte type, 2-byte length, body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// Raw extension type code
    pub code: u16,

    /// Extension data
    pub data: Vec<u8>,
}

impl Extension {
    /// Create a new extension of a known type.
    pub fn new(extension_type: ExtensionType, data: Vec<u8>) -> Self {
        Self {
            code: extension_type.to_u16(),
            data,
        }
    }

    /// The known type, or `None` for an extension this crate does not model.
    pub fn extension_type(&self) -> Option<ExtensionType> {
        ExtensionType::from_u16(self.code)
    }

    /// Encode the extension to bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if self.data.len() > u16::MAX as usize {
            return Err(Error::MalformedMessage(format!(
                "extension 0x{:04x} too large",
                self.code
            )));
        }

        let mut buf = Vec::with_capacity(4 + self.data.len());
        buf.extend_from_slice(&self.code.to_be_bytes());
        buf.extend_from_slice(&(self.data.len() as u16).to_be_bytes());
        buf.extend_from_slice(&self.data);
        Ok(buf)
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let code = reader.u16()?;
        let data = reader.vec_u16()?.to_vec();
        Ok(Self { code, data })
    }
}

/// Ordered extension list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    extensions: Vec<Extension>,
}

impl Extensions {
    /// Create a new empty extension list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an extension.
    pub fn add(&mut self, extension: Extension) {
        self.extensions.push(extension);
    }

    /// Get an extension by type.
    pub fn get(&self, ext_type: ExtensionType) -> Option<&Extension> {
        let code = ext_type.to_u16();
        self.extensions.iter().find(|e| e.code == code)
    }

    /// Check if an extension is present.
    pub fn has(&self, ext_type: ExtensionType) -> bool {
        self.get(ext_type).is_some()
    }

    /// Iterate over all extensions in wire order.
    pub fn iter(&self) -> impl Iterator<Item = &Extension> {
        self.extensions.iter()
    }

    /// Extensions whose type is unknown to this crate.
    pub fn unknown(&self) -> impl Iterator<Item = &Extension> {
        self.extensions.iter().filter(|e| e.extension_type().is_none())
    }

    /// Encode the list with its 2-byte length prefix.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        for ext in &self.extensions {
            body.extend_from_slice(&ext.encode()?);
        }
        if body.len() > u16::MAX as usize {
            return Err(Error::MalformedMessage("extension block too large".into()));
        }

        let mut buf = Vec::with_capacity(2 + body.len());
        buf.extend_from_slice(&(body.len() as u16).to_be_bytes());
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    /// Decode a length-prefixed extension block.
    ///
    /// The same type appearing twice is a decode error (RFC 5246 Section 7.4.1.4).
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut outer = Reader::new(data);
        let block = outer.vec_u16()?;
        outer.finish("extension block")?;

        let mut reader = Reader::new(block);
        let mut extensions: Vec<Extension> = Vec::new();
        while !reader.is_empty() {
            let ext = Extension::read(&mut reader)?;
            if extensions.iter().any(|e| e.code == ext.code) {
                return Err(Error::MalformedMessage(format!(
                    "duplicate extension 0x{:04x}",
                    ext.code
                )));
            }
            extensions.push(ext);
        }

        Ok(Self { extensions })
    }

    /// Get the number of extensions.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Check if the extension list is empty.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
