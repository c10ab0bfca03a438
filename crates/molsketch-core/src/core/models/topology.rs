use super::ids::AtomId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The drawing style of a bond, which also fixes its nominal bond order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BondKind {
    #[default]
    Single,
    Double,
    Triple,
    Quadruple,
    /// Solid wedge: the far end points toward the viewer.
    WedgeSolid,
    /// Hashed wedge: the far end points away from the viewer.
    WedgeHash,
    HollowWedge,
    Wavy,
    Dative,
    Resonance,
    ZeroOrder,
    Bold,
    Hydrogen,
    Ionic,
}

impl BondKind {
    /// The bond order a freshly drawn bond of this kind contributes to valence.
    pub fn nominal_order(self) -> u8 {
        match self {
            Self::Double => 2,
            Self::Triple => 3,
            Self::Quadruple => 4,
            Self::ZeroOrder | Self::Hydrogen | Self::Ionic => 0,
            Self::Single
            | Self::WedgeSolid
            | Self::WedgeHash
            | Self::HollowWedge
            | Self::Wavy
            | Self::Dative
            | Self::Resonance
            | Self::Bold => 1,
        }
    }

    pub fn is_stereo_wedge(self) -> bool {
        matches!(self, Self::WedgeSolid | Self::WedgeHash)
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond kind string")]
pub struct ParseBondKindError;

impl FromStr for BondKind {
    type Err = ParseBondKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "1" | "single" => Ok(Self::Single),
            "2" | "double" => Ok(Self::Double),
            "3" | "triple" => Ok(Self::Triple),
            "4" | "quadruple" => Ok(Self::Quadruple),
            "wedge" | "wedge-solid" => Ok(Self::WedgeSolid),
            "hash" | "wedge-hash" => Ok(Self::WedgeHash),
            "hollow-wedge" => Ok(Self::HollowWedge),
            "wavy" => Ok(Self::Wavy),
            "dative" => Ok(Self::Dative),
            "resonance" => Ok(Self::Resonance),
            "zero-order" => Ok(Self::ZeroOrder),
            "bold" => Ok(Self::Bold),
            "hydrogen" => Ok(Self::Hydrogen),
            "ionic" => Ok(Self::Ionic),
            _ => Err(ParseBondKindError),
        }
    }
}

impl fmt::Display for BondKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "single",
                Self::Double => "double",
                Self::Triple => "triple",
                Self::Quadruple => "quadruple",
                Self::WedgeSolid => "wedge-solid",
                Self::WedgeHash => "wedge-hash",
                Self::HollowWedge => "hollow-wedge",
                Self::Wavy => "wavy",
                Self::Dative => "dative",
                Self::Resonance => "resonance",
                Self::ZeroOrder => "zero-order",
                Self::Bold => "bold",
                Self::Hydrogen => "hydrogen",
                Self::Ionic => "ionic",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bond {
    pub atom1_id: AtomId, // begin atom (narrow end of a wedge)
    pub atom2_id: AtomId,
    pub order: u8,
    pub kind: BondKind,
}

impl Bond {
    pub fn new(atom1_id: AtomId, atom2_id: AtomId, kind: BondKind) -> Self {
        Self {
            atom1_id,
            atom2_id,
            order: kind.nominal_order(),
            kind,
        }
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atom1_id == atom_id || self.atom2_id == atom_id
    }

    /// Returns the endpoint opposite `atom_id`, or `None` if the bond does not touch it.
    pub fn other(&self, atom_id: AtomId) -> Option<AtomId> {
        if self.atom1_id == atom_id {
            Some(self.atom2_id)
        } else if self.atom2_id == atom_id {
            Some(self.atom1_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_atom_id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn bond_kind_from_str_parses_valid_strings() {
        assert_eq!("1".parse::<BondKind>().unwrap(), BondKind::Single);
        assert_eq!("double".parse::<BondKind>().unwrap(), BondKind::Double);
        assert_eq!("Triple".parse::<BondKind>().unwrap(), BondKind::Triple);
        assert_eq!("wedge".parse::<BondKind>().unwrap(), BondKind::WedgeSolid);
        assert_eq!("wedge_hash".parse::<BondKind>().unwrap(), BondKind::WedgeHash);
        assert_eq!("zero-order".parse::<BondKind>().unwrap(), BondKind::ZeroOrder);
    }

    #[test]
    fn bond_kind_from_str_rejects_invalid_strings() {
        assert!("".parse::<BondKind>().is_err());
        assert!("quintuple".parse::<BondKind>().is_err());
        assert!("5".parse::<BondKind>().is_err());
    }

    #[test]
    fn bond_kind_display_round_trips_through_from_str() {
        for kind in [
            BondKind::Single,
            BondKind::WedgeSolid,
            BondKind::HollowWedge,
            BondKind::Resonance,
            BondKind::Ionic,
        ] {
            assert_eq!(kind.to_string().parse::<BondKind>().unwrap(), kind);
        }
    }

    #[test]
    fn nominal_orders_match_drawing_conventions() {
        assert_eq!(BondKind::Single.nominal_order(), 1);
        assert_eq!(BondKind::Double.nominal_order(), 2);
        assert_eq!(BondKind::Triple.nominal_order(), 3);
        assert_eq!(BondKind::Quadruple.nominal_order(), 4);
        assert_eq!(BondKind::WedgeHash.nominal_order(), 1);
        assert_eq!(BondKind::Ionic.nominal_order(), 0);
        assert_eq!(BondKind::default(), BondKind::Single);
    }

    #[test]
    fn bond_new_takes_order_from_kind() {
        let bond = Bond::new(dummy_atom_id(1), dummy_atom_id(2), BondKind::Triple);
        assert_eq!(bond.order, 3);
        assert_eq!(bond.kind, BondKind::Triple);
    }

    #[test]
    fn bond_other_returns_opposite_endpoint() {
        let a1 = dummy_atom_id(10);
        let a2 = dummy_atom_id(20);
        let bond = Bond::new(a1, a2, BondKind::Single);
        assert!(bond.contains(a1));
        assert_eq!(bond.other(a1), Some(a2));
        assert_eq!(bond.other(a2), Some(a1));
        assert_eq!(bond.other(dummy_atom_id(30)), None);
    }
}
