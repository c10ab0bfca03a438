use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::ids::{AtomId, BondId};
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::Bond;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::warn;

pub const FORMAT_VERSION: u32 = 1;

/// Canvas viewport persisted alongside the molecule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub zoom: f64,
    pub offset: Vector2<f64>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset: Vector2::zeros(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported document version {found} (this build reads up to {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

#[derive(Serialize)]
struct SavedDocumentRef<'a> {
    version: u32,
    timestamp: u64,
    molecule: SavedMoleculeRef<'a>,
    view: &'a ViewState,
}

#[derive(Serialize)]
struct SavedMoleculeRef<'a> {
    atoms: Vec<(AtomId, &'a Atom)>,
    bonds: Vec<(BondId, &'a Bond)>,
}

#[derive(Deserialize)]
struct SavedDocument {
    version: u32,
    #[serde(default)]
    #[allow(dead_code)]
    timestamp: u64,
    molecule: SavedMolecule,
    #[serde(default)]
    view: ViewState,
}

#[derive(Deserialize)]
struct SavedMolecule {
    #[serde(default)]
    atoms: Vec<(AtomId, Atom)>,
    #[serde(default)]
    bonds: Vec<(BondId, Bond)>,
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Rebuilds a molecule from saved records, allocating fresh ids in saved order.
fn rebuild(saved: SavedMolecule) -> Molecule {
    let mut molecule = Molecule::new();
    let mut remap: HashMap<AtomId, AtomId> = HashMap::with_capacity(saved.atoms.len());
    for (old_id, atom) in saved.atoms {
        remap.insert(old_id, molecule.add_atom(atom));
    }
    for (old_id, bond) in saved.bonds {
        let (Some(&atom1_id), Some(&atom2_id)) =
            (remap.get(&bond.atom1_id), remap.get(&bond.atom2_id))
        else {
            warn!("Skipping saved bond {:?}: endpoint atom missing", old_id);
            continue;
        };
        molecule.insert_bond(Bond {
            atom1_id,
            atom2_id,
            ..bond
        });
    }
    molecule
}

/// The editor's JSON save format.
pub struct DocumentFile;

impl MolecularFile for DocumentFile {
    type Metadata = ViewState;
    type Error = DocumentError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Molecule, Self::Metadata), Self::Error> {
        let saved: SavedDocument = serde_json::from_reader(reader)?;
        if saved.version > FORMAT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: saved.version,
                supported: FORMAT_VERSION,
            });
        }
        Ok((rebuild(saved.molecule), saved.view))
    }

    fn write_to(
        molecule: &Molecule,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let document = SavedDocumentRef {
            version: FORMAT_VERSION,
            timestamp: unix_millis(),
            molecule: SavedMoleculeRef {
                atoms: molecule.atoms_iter().collect(),
                bonds: molecule.bonds_iter().collect(),
            },
            view: metadata,
        };
        serde_json::to_writer_pretty(&mut *writer, &document)?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_molecule_to(molecule: &Molecule, writer: &mut impl Write) -> Result<(), Self::Error> {
        Self::write_to(molecule, &ViewState::default(), writer)
    }
}

pub fn to_json_string(molecule: &Molecule, view: &ViewState) -> Result<String, DocumentError> {
    let mut buffer = Vec::new();
    DocumentFile::write_to(molecule, view, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| DocumentError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

pub fn from_json_str(text: &str) -> Result<(Molecule, ViewState), DocumentError> {
    DocumentFile::read_from(&mut text.as_bytes())
}
