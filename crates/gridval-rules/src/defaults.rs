//! Engine-assumed defaults.
//!
//! The calculation engine fills in some optional fields before it runs. Rules
//! that compare those fields must see the same values, so validation works on
//! a copy produced by [`with_defaults`]. The caller's dataset is never touched.

use gridval_core::{ComponentType, Dataset, GridResult};

/// Where a missing value comes from.
enum Fill {
    Constant(f64),
    Field(&'static str),
}

/// `(component, field, fill)` in application order; later entries may read
/// fields filled by earlier ones.
const DEFAULTS: &[(ComponentType, &str, Fill)] = &[
    (ComponentType::Transformer, "tap_nom", Fill::Constant(0.0)),
    (ComponentType::Transformer, "tap_pos", Fill::Field("tap_nom")),
    (ComponentType::Transformer, "uk_min", Fill::Field("uk")),
    (ComponentType::Transformer, "uk_max", Fill::Field("uk")),
    (ComponentType::ThreeWindingTransformer, "tap_nom", Fill::Constant(0.0)),
    (ComponentType::ThreeWindingTransformer, "tap_pos", Fill::Field("tap_nom")),
    (ComponentType::ThreeWindingTransformer, "uk_12_min", Fill::Field("uk_12")),
    (ComponentType::ThreeWindingTransformer, "uk_12_max", Fill::Field("uk_12")),
    (ComponentType::ThreeWindingTransformer, "uk_13_min", Fill::Field("uk_13")),
    (ComponentType::ThreeWindingTransformer, "uk_13_max", Fill::Field("uk_13")),
    (ComponentType::ThreeWindingTransformer, "uk_23_min", Fill::Field("uk_23")),
    (ComponentType::ThreeWindingTransformer, "uk_23_max", Fill::Field("uk_23")),
    (ComponentType::Source, "sk", Fill::Constant(1e10)),
    (ComponentType::Source, "rx_ratio", Fill::Constant(0.1)),
    (ComponentType::Source, "z01_ratio", Fill::Constant(1.0)),
    (
        ComponentType::TransformerTapRegulator,
        "line_drop_compensation_r",
        Fill::Constant(0.0),
    ),
    (
        ComponentType::TransformerTapRegulator,
        "line_drop_compensation_x",
        Fill::Constant(0.0),
    ),
];

/// Copy of `data` with engine defaults filled into missing entries.
pub fn with_defaults(data: &Dataset) -> GridResult<Dataset> {
    let mut out = data.clone();
    for (component, field, fill) in DEFAULTS {
        let Some(table) = out.get_mut(*component) else {
            continue;
        };
        match fill {
            Fill::Constant(value) => table.column_mut(field)?.fill_missing(*value),
            Fill::Field(source) => {
                let source = table.column(source)?.clone();
                table.column_mut(field)?.fill_missing_from(&source);
            }
        }
    }
    Ok(out)
}
