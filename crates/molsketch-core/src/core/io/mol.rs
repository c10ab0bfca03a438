use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::ids::{AtomId, BondId};
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::{Bond, BondKind};
use nalgebra::Point2;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::warn;

/// Canvas pixels per ångström used when converting to and from MOL coordinates.
pub const DEFAULT_PIXELS_PER_ANGSTROM: f64 = 30.0;

const COUNTS_SUFFIX: &str = "  0  0  0  0  0  0  0  0999 V2000";
const ATOM_LINE_SUFFIX: &str = " 0  0  0  0  0  0  0  0  0  0  0  0";
const BOND_LINE_SUFFIX: &str = "  0  0  0";
const ENTRIES_PER_PROPERTY_LINE: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct MolMetadata {
    /// Header line 1.
    pub name: String,
    /// Program field of header line 2 (8 columns).
    pub program: String,
    /// Header line 3.
    pub comment: String,
    pub pixels_per_angstrom: f64,
}

impl Default for MolMetadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            program: "MSKETCH".to_string(),
            comment: String::new(),
            pixels_per_angstrom: DEFAULT_PIXELS_PER_ANGSTROM,
        }
    }
}

#[derive(Debug, Error)]
pub enum MolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: MolParseErrorKind },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
    #[error("Unsupported connection table version: {0}")]
    UnsupportedVersion(String),
    #[error("Bond {bond} has order {order}, which V2000 cannot represent")]
    UnsupportedBondOrder { bond: String, order: u8 },
}

#[derive(Debug, Error)]
pub enum MolParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Malformed property line")]
    InvalidPropertyLine,
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_int(line: &str, line_num: usize, start: usize, end: usize) -> Result<i32, MolError> {
    let value = slice_and_trim(line, start, end);
    let columns = format!("{}-{}", start + 1, end);
    if value.is_empty() {
        return Err(MolError::Parse {
            line: line_num,
            kind: MolParseErrorKind::MissingRequiredField { columns },
        });
    }
    value.parse().map_err(|_| MolError::Parse {
        line: line_num,
        kind: MolParseErrorKind::InvalidInt {
            columns,
            value: value.into(),
        },
    })
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, MolError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| MolError::Parse {
        line: line_num,
        kind: MolParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

/// Optional integer column; blank columns read as zero.
fn parse_optional_int(line: &str, line_num: usize, start: usize, end: usize) -> Result<i32, MolError> {
    if slice_and_trim(line, start, end).is_empty() {
        Ok(0)
    } else {
        parse_int(line, line_num, start, end)
    }
}

/// Decodes the atom-block charge column: `(charge, doublet radical)`.
fn decode_charge_code(code: i32) -> (i8, bool) {
    match code {
        1 => (3, false),
        2 => (2, false),
        3 => (1, false),
        4 => (0, true),
        5 => (-1, false),
        6 => (-2, false),
        7 => (-3, false),
        _ => (0, false),
    }
}

fn bond_type_code(bond_id: BondId, bond: &Bond) -> Result<u8, MolError> {
    match bond.kind {
        BondKind::Resonance => Ok(4),
        BondKind::ZeroOrder | BondKind::Hydrogen | BondKind::Ionic => Ok(8),
        _ if (1..=3).contains(&bond.order) => Ok(bond.order),
        _ => Err(MolError::UnsupportedBondOrder {
            bond: format!("{:?}", bond_id),
            order: bond.order,
        }),
    }
}

fn bond_stereo_code(kind: BondKind) -> u8 {
    match kind {
        BondKind::WedgeSolid => 1,
        BondKind::WedgeHash => 6,
        BondKind::Wavy => 4,
        _ => 0,
    }
}

fn decode_bond(type_code: i32, stereo_code: i32, line_num: usize) -> BondKind {
    match (type_code, stereo_code) {
        (1, 1) => BondKind::WedgeSolid,
        (1, 6) => BondKind::WedgeHash,
        (1, 4) => BondKind::Wavy,
        (1, _) => BondKind::Single,
        (2, _) => BondKind::Double,
        (3, _) => BondKind::Triple,
        (4, _) => BondKind::Resonance,
        (8, _) => BondKind::ZeroOrder,
        (other, _) => {
            warn!(
                "Line {}: unsupported bond type {}, reading it as single",
                line_num, other
            );
            BondKind::Single
        }
    }
}

/// V2000 radical codes: 2 = doublet (one unpaired electron), 3 = triplet.
fn radical_code(radicals: u8) -> u8 {
    if radicals >= 2 { 3 } else { 2 }
}

fn radicals_from_code(code: i32) -> u8 {
    match code {
        2 => 1,
        1 | 3 => 2,
        _ => 0,
    }
}

fn write_property_lines(
    writer: &mut impl Write,
    tag: &str,
    entries: &[(usize, i32)],
) -> io::Result<()> {
    for chunk in entries.chunks(ENTRIES_PER_PROPERTY_LINE) {
        write!(writer, "M  {}{:>3}", tag, chunk.len())?;
        for (index, value) in chunk {
            write!(writer, " {:>3} {:>3}", index, value)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Parses `M  XXXnn8 aaa vvv ...` into `(atom number, value)` pairs.
fn parse_property_line(line: &str, line_num: usize) -> Result<Vec<(usize, i32)>, MolError> {
    let malformed = || MolError::Parse {
        line: line_num,
        kind: MolParseErrorKind::InvalidPropertyLine,
    };
    let mut tokens = line.get(6..).unwrap_or("").split_whitespace();
    let count: usize = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(malformed)?;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let index = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(malformed)?;
        let value = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(malformed)?;
        entries.push((index, value));
    }
    Ok(entries)
}

pub struct MolFile;

impl MolFile {
    /// Reads a V2000 block, converting coordinates with the given scale.
    pub fn read_scaled(
        reader: &mut impl BufRead,
        pixels_per_angstrom: f64,
    ) -> Result<(Molecule, MolMetadata), MolError> {
        let mut lines = reader.lines().enumerate().map(|(i, l)| (i + 1, l));
        let mut next_line = |what: &str| -> Result<(usize, String), MolError> {
            match lines.next() {
                Some((num, line)) => Ok((num, line?)),
                None => Err(MolError::MissingRecord(what.to_string())),
            }
        };

        let (_, name) = next_line("header")?;
        let (_, program_line) = next_line("header")?;
        let (_, comment) = next_line("header")?;
        let metadata = MolMetadata {
            name: name.trim_end().to_string(),
            program: slice_and_trim(&program_line, 2, 10).to_string(),
            comment: comment.trim_end().to_string(),
            pixels_per_angstrom,
        };

        let (counts_num, counts) = next_line("counts line")?;
        if counts.contains("V3000") {
            return Err(MolError::UnsupportedVersion("V3000".into()));
        }
        let atom_count = parse_int(&counts, counts_num, 0, 3)?;
        let bond_count = parse_int(&counts, counts_num, 3, 6)?;
        if atom_count < 0 || bond_count < 0 {
            return Err(MolError::Inconsistency(format!(
                "Negative counts: {} atoms, {} bonds",
                atom_count, bond_count
            )));
        }

        let mut molecule = Molecule::new();
        let mut ids: Vec<AtomId> = Vec::with_capacity(atom_count as usize);
        for _ in 0..atom_count {
            let (num, line) = next_line("atom block")?;
            let x = parse_float(&line, num, 0, 10)?;
            let y = parse_float(&line, num, 10, 20)?;
            let symbol = slice_and_trim(&line, 31, 34);
            if symbol.is_empty() {
                return Err(MolError::Parse {
                    line: num,
                    kind: MolParseErrorKind::MissingRequiredField {
                        columns: "32-34".into(),
                    },
                });
            }
            let (charge, radical) = decode_charge_code(parse_optional_int(&line, num, 36, 39)?);
            let mut atom = Atom::new(
                symbol,
                Point2::new(x * pixels_per_angstrom, -y * pixels_per_angstrom),
            )
            .with_charge(charge);
            atom.radicals = u8::from(radical);
            ids.push(molecule.add_atom(atom));
        }

        let resolve = |index: i32| -> Result<AtomId, MolError> {
            usize::try_from(index - 1)
                .ok()
                .and_then(|i| ids.get(i).copied())
                .ok_or_else(|| {
                    MolError::Inconsistency(format!("Atom number {} out of range", index))
                })
        };

        for _ in 0..bond_count {
            let (num, line) = next_line("bond block")?;
            let atom1_id = resolve(parse_int(&line, num, 0, 3)?)?;
            let atom2_id = resolve(parse_int(&line, num, 3, 6)?)?;
            let type_code = parse_int(&line, num, 6, 9)?;
            let stereo_code = parse_optional_int(&line, num, 9, 12)?;
            let kind = decode_bond(type_code, stereo_code, num);
            let mut bond = Bond::new(atom1_id, atom2_id, kind);
            if matches!(type_code, 1..=3) {
                bond.order = type_code as u8;
            }
            if molecule.insert_bond(bond).is_none() {
                warn!("Line {}: bond skipped", num);
            }
        }

        let mut charges: Option<HashMap<AtomId, i8>> = None;
        let mut radicals: Option<HashMap<AtomId, u8>> = None;
        for (num, line) in lines {
            let line = line?;
            if line.starts_with("M  END") {
                break;
            }
            if line.starts_with("M  CHG") {
                let map = charges.get_or_insert_with(HashMap::new);
                for (index, value) in parse_property_line(&line, num)? {
                    map.insert(resolve(index as i32)?, value.clamp(-128, 127) as i8);
                }
            } else if line.starts_with("M  RAD") {
                let map = radicals.get_or_insert_with(HashMap::new);
                for (index, value) in parse_property_line(&line, num)? {
                    map.insert(resolve(index as i32)?, radicals_from_code(value));
                }
            } else if line.starts_with("M  ISO") {
                for (index, value) in parse_property_line(&line, num)? {
                    if let Some(atom) = molecule.atom_mut(resolve(index as i32)?) {
                        atom.isotope = u16::try_from(value).ok();
                    }
                }
            }
        }

        // Property lines supersede the atom-block charge and radical columns.
        if charges.is_some() || radicals.is_some() {
            let charges = charges.unwrap_or_default();
            let radicals = radicals.unwrap_or_default();
            for (id, atom) in molecule.atoms_iter_mut() {
                atom.charge = charges.get(&id).copied().unwrap_or(0);
                atom.radicals = radicals.get(&id).copied().unwrap_or(0);
            }
        }

        Ok((molecule, metadata))
    }
}

impl MolecularFile for MolFile {
    type Metadata = MolMetadata;
    type Error = MolError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Molecule, Self::Metadata), Self::Error> {
        Self::read_scaled(reader, DEFAULT_PIXELS_PER_ANGSTROM)
    }

    fn write_to(
        molecule: &Molecule,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        if molecule.is_empty() {
            return Ok(());
        }
        let scale = metadata.pixels_per_angstrom;

        writeln!(writer, "{}", metadata.name)?;
        writeln!(writer, "  {:<8.8}          2D", metadata.program)?;
        writeln!(writer, "{}", metadata.comment)?;
        writeln!(
            writer,
            "{:>3}{:>3}{}",
            molecule.atom_count(),
            molecule.bond_count(),
            COUNTS_SUFFIX
        )?;

        let mut serials: HashMap<AtomId, usize> = HashMap::new();
        let mut charges = Vec::new();
        let mut isotopes = Vec::new();
        let mut radicals = Vec::new();
        for (i, (id, atom)) in molecule.atoms_iter().enumerate() {
            let serial = i + 1;
            serials.insert(id, serial);
            // `+ 0.0` keeps a negated zero from printing as "-0.0000".
            writeln!(
                writer,
                "{:>10.4}{:>10.4}{:>10.4} {:<3}{}",
                atom.position.x / scale + 0.0,
                -atom.position.y / scale + 0.0,
                0.0,
                atom.element,
                ATOM_LINE_SUFFIX
            )?;
            if atom.charge != 0 {
                charges.push((serial, i32::from(atom.charge)));
            }
            if let Some(isotope) = atom.isotope {
                isotopes.push((serial, i32::from(isotope)));
            }
            if atom.radicals > 0 {
                radicals.push((serial, i32::from(radical_code(atom.radicals))));
            }
        }

        for (bond_id, bond) in molecule.bonds_iter() {
            let (Some(a1), Some(a2)) = (serials.get(&bond.atom1_id), serials.get(&bond.atom2_id))
            else {
                return Err(MolError::Inconsistency(format!(
                    "Bond {:?} references a missing atom",
                    bond_id
                )));
            };
            writeln!(
                writer,
                "{:>3}{:>3}{:>3}{:>3}{}",
                a1,
                a2,
                bond_type_code(bond_id, bond)?,
                bond_stereo_code(bond.kind),
                BOND_LINE_SUFFIX
            )?;
        }

        write_property_lines(writer, "CHG", &charges)?;
        write_property_lines(writer, "ISO", &isotopes)?;
        write_property_lines(writer, "RAD", &radicals)?;
        writeln!(writer, "M  END")?;
        Ok(())
    }

    fn write_molecule_to(molecule: &Molecule, writer: &mut impl Write) -> Result<(), Self::Error> {
        Self::write_to(molecule, &MolMetadata::default(), writer)
    }
}

/// Renders `molecule` as a V2000 block; empty for an empty molecule.
pub fn to_mol(molecule: &Molecule, pixels_per_angstrom: f64) -> Result<String, MolError> {
    let metadata = MolMetadata {
        pixels_per_angstrom,
        ..MolMetadata::default()
    };
    let mut buffer = Vec::new();
    MolFile::write_to(molecule, &metadata, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| MolError::Inconsistency(e.to_string()))
}
