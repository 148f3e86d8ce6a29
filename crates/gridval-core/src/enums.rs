//! Enumerated field domains.
//!
//! Integer fields such as `winding_from` or `fault_type` are stored as `int8`
//! but only a fixed set of values is meaningful. Each domain gets a typed enum
//! for rule logic and an [`EnumKind`] tag for error payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generates a `#[repr(i8)]` domain enum with value table and conversions.
macro_rules! grid_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:expr => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        #[repr(i8)]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            /// Every member of the domain, in declaration order.
            pub const VALUES: &'static [$name] = &[$($name::$variant),+];

            #[inline]
            pub fn value(self) -> i8 {
                self as i8
            }

            pub fn from_value(value: i64) -> Option<Self> {
                match value {
                    $(v if v == $value as i64 => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

grid_enum!(
    /// How a load or generator responds to voltage.
    LoadGenType {
        ConstPower = 0 => "const_power",
        ConstImpedance = 1 => "const_impedance",
        ConstCurrent = 2 => "const_current",
    }
);

grid_enum!(
    /// Transformer winding connection.
    WindingType {
        Wye = 0 => "wye",
        WyeN = 1 => "wye_n",
        Delta = 2 => "delta",
        Zigzag = 3 => "zigzag",
        ZigzagN = 4 => "zigzag_n",
    }
);

grid_enum!(
    /// Terminal of a two-terminal branch.
    BranchSide {
        FromSide = 0 => "from_side",
        ToSide = 1 => "to_side",
    }
);

grid_enum!(
    /// Terminal of a three-terminal branch.
    Branch3Side {
        Side1 = 0 => "side_1",
        Side2 = 1 => "side_2",
        Side3 = 2 => "side_3",
    }
);

grid_enum!(
    /// Which terminal of which object a sensor measures.
    MeasuredTerminalType {
        BranchFrom = 0 => "branch_from",
        BranchTo = 1 => "branch_to",
        Source = 2 => "source",
        Shunt = 3 => "shunt",
        Load = 4 => "load",
        Generator = 5 => "generator",
        Branch3Side1 = 6 => "branch3_1",
        Branch3Side2 = 7 => "branch3_2",
        Branch3Side3 = 8 => "branch3_3",
        Node = 9 => "node",
    }
);

grid_enum!(
    /// Short-circuit fault type.
    FaultType {
        ThreePhase = 0 => "three_phase",
        SinglePhaseToGround = 1 => "single_phase_to_ground",
        TwoPhase = 2 => "two_phase",
        TwoPhaseToGround = 3 => "two_phase_to_ground",
    }
);

grid_enum!(
    /// Phases involved in a fault. `DefaultValue` lets the engine pick.
    FaultPhase {
        Abc = 0 => "abc",
        A = 1 => "a",
        B = 2 => "b",
        C = 3 => "c",
        Ab = 4 => "ab",
        Ac = 5 => "ac",
        Bc = 6 => "bc",
        DefaultValue = -1 => "default_value",
    }
);

grid_enum!(
    /// Reference frame of a current angle measurement.
    AngleMeasurementType {
        LocalAngle = 0 => "local_angle",
        GlobalAngle = 1 => "global_angle",
    }
);

impl WindingType {
    /// Wye-type windings (with or without neutral) for clock parity.
    pub fn is_wye(self) -> bool {
        matches!(self, WindingType::Wye | WindingType::WyeN)
    }
}

impl FaultType {
    /// Fault phases the engine supports for this fault type.
    pub fn supported_phases(self) -> &'static [FaultPhase] {
        match self {
            FaultType::ThreePhase => &[FaultPhase::Abc, FaultPhase::DefaultValue],
            FaultType::SinglePhaseToGround => &[
                FaultPhase::A,
                FaultPhase::B,
                FaultPhase::C,
                FaultPhase::DefaultValue,
            ],
            FaultType::TwoPhase | FaultType::TwoPhaseToGround => &[
                FaultPhase::Ab,
                FaultPhase::Ac,
                FaultPhase::Bc,
                FaultPhase::DefaultValue,
            ],
        }
    }
}

/// Tag naming an enum domain, used in error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnumKind {
    LoadGenType,
    WindingType,
    BranchSide,
    Branch3Side,
    MeasuredTerminalType,
    FaultType,
    FaultPhase,
    AngleMeasurementType,
}

impl EnumKind {
    /// Raw values belonging to the domain.
    pub fn values(self) -> Vec<i8> {
        fn raw<T: Copy>(values: &[T], value: impl Fn(T) -> i8) -> Vec<i8> {
            values.iter().copied().map(value).collect()
        }
        match self {
            EnumKind::LoadGenType => raw(LoadGenType::VALUES, LoadGenType::value),
            EnumKind::WindingType => raw(WindingType::VALUES, WindingType::value),
            EnumKind::BranchSide => raw(BranchSide::VALUES, BranchSide::value),
            EnumKind::Branch3Side => raw(Branch3Side::VALUES, Branch3Side::value),
            EnumKind::MeasuredTerminalType => {
                raw(MeasuredTerminalType::VALUES, MeasuredTerminalType::value)
            }
            EnumKind::FaultType => raw(FaultType::VALUES, FaultType::value),
            EnumKind::FaultPhase => raw(FaultPhase::VALUES, FaultPhase::value),
            EnumKind::AngleMeasurementType => {
                raw(AngleMeasurementType::VALUES, AngleMeasurementType::value)
            }
        }
    }

    pub fn contains(self, value: i64) -> bool {
        self.values().iter().any(|v| i64::from(*v) == value)
    }

    pub fn name(self) -> &'static str {
        match self {
            EnumKind::LoadGenType => "LoadGenType",
            EnumKind::WindingType => "WindingType",
            EnumKind::BranchSide => "BranchSide",
            EnumKind::Branch3Side => "Branch3Side",
            EnumKind::MeasuredTerminalType => "MeasuredTerminalType",
            EnumKind::FaultType => "FaultType",
            EnumKind::FaultPhase => "FaultPhase",
            EnumKind::AngleMeasurementType => "AngleMeasurementType",
        }
    }
}

impl fmt::Display for EnumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Calculation the validated data is destined for.
///
/// Entry points take `Option<CalculationType>`; `None` means "any", which
/// activates the union of all calculation-specific requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    PowerFlow,
    StateEstimation,
    ShortCircuit,
}

impl CalculationType {
    /// Whether requirements tied to `self` apply when validating for `requested`.
    pub fn applies_to(self, requested: Option<CalculationType>) -> bool {
        requested.map_or(true, |requested| requested == self)
    }
}

impl fmt::Display for CalculationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationType::PowerFlow => f.write_str("power_flow"),
            CalculationType::StateEstimation => f.write_str("state_estimation"),
            CalculationType::ShortCircuit => f.write_str("short_circuit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_value_maps_known_values() {
        assert_eq!(WindingType::from_value(2), Some(WindingType::Delta));
        assert_eq!(WindingType::from_value(5), None);
        assert_eq!(FaultPhase::from_value(-1), Some(FaultPhase::DefaultValue));
        assert_eq!(
            MeasuredTerminalType::from_value(9),
            Some(MeasuredTerminalType::Node)
        );
    }

    #[test]
    fn test_enum_kind_values() {
        assert_eq!(EnumKind::BranchSide.values(), vec![0, 1]);
        assert!(EnumKind::FaultPhase.contains(-1));
        assert!(!EnumKind::FaultType.contains(-128));
    }

    #[test]
    fn test_wye_windings() {
        assert!(WindingType::Wye.is_wye());
        assert!(WindingType::WyeN.is_wye());
        assert!(!WindingType::Zigzag.is_wye());
    }

    #[test]
    fn test_unspecified_calculation_activates_everything() {
        assert!(CalculationType::PowerFlow.applies_to(None));
        assert!(CalculationType::PowerFlow.applies_to(Some(CalculationType::PowerFlow)));
        assert!(!CalculationType::PowerFlow.applies_to(Some(CalculationType::ShortCircuit)));
    }
}
