use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The fixed catalog of engineering properties tracked per candidate material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    Cte,
    Cost,
    HdtHighLoad,
    HdtLowLoad,
    InterfacialShearStrength,
    Shrinkage,
    TensileStrength,
    FlexuralModulus,
    ElongationAtBreak,
    Density,
    GlassTransition,
    MeltingTemperature,
    ProcessingTemperature,
    InjectionPressure,
}

impl PropertyKind {
    /// Every known property, in catalog order. Import templates and export
    /// tables follow this order.
    pub const ALL: [PropertyKind; 14] = [
        PropertyKind::Cte,
        PropertyKind::Cost,
        PropertyKind::HdtHighLoad,
        PropertyKind::HdtLowLoad,
        PropertyKind::InterfacialShearStrength,
        PropertyKind::Shrinkage,
        PropertyKind::TensileStrength,
        PropertyKind::FlexuralModulus,
        PropertyKind::ElongationAtBreak,
        PropertyKind::Density,
        PropertyKind::GlassTransition,
        PropertyKind::MeltingTemperature,
        PropertyKind::ProcessingTemperature,
        PropertyKind::InjectionPressure,
    ];

    /// Properties users may filter and weight. CTE and the two HDT test
    /// points are consumed by the pre-screening rules instead.
    pub const FILTERABLE: [PropertyKind; 11] = [
        PropertyKind::Cost,
        PropertyKind::InterfacialShearStrength,
        PropertyKind::Shrinkage,
        PropertyKind::TensileStrength,
        PropertyKind::FlexuralModulus,
        PropertyKind::ElongationAtBreak,
        PropertyKind::Density,
        PropertyKind::GlassTransition,
        PropertyKind::MeltingTemperature,
        PropertyKind::ProcessingTemperature,
        PropertyKind::InjectionPressure,
    ];

    /// Human-readable column label, also used for import/export headers.
    pub const fn label(self) -> &'static str {
        match self {
            PropertyKind::Cte => "CTE (µm/m·°C)",
            PropertyKind::Cost => "Cost (USD/kg)",
            PropertyKind::HdtHighLoad => "HDT @ 1.8 MPa (°C)",
            PropertyKind::HdtLowLoad => "HDT @ 0.46 MPa (°C)",
            PropertyKind::InterfacialShearStrength => "IFSS (MPa)",
            PropertyKind::Shrinkage => "Shrinkage (%)",
            PropertyKind::TensileStrength => "Tensile Strength (MPa)",
            PropertyKind::FlexuralModulus => "Flexural Modulus (GPa)",
            PropertyKind::ElongationAtBreak => "Elongation at Break (%)",
            PropertyKind::Density => "Density (kg/m³)",
            PropertyKind::GlassTransition => "Tg (°C)",
            PropertyKind::MeltingTemperature => "Tm (°C)",
            PropertyKind::ProcessingTemperature => "Processing Temp (°C)",
            PropertyKind::InjectionPressure => "Injection Pressure (MPa)",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(label.trim()))
    }

    pub fn is_filterable(self) -> bool {
        Self::FILTERABLE.contains(&self)
    }
}

/// A property value declared as a [min, max] interval.
///
/// Datasheets quote spreads rather than single figures, so every stored
/// value is an interval; a point value is simply `min == max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeValue {
    pub min: f64,
    pub max: f64,
}

impl RangeValue {
    /// Inverted bounds are swapped rather than rejected; sheets in the wild
    /// list them both ways.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn mean(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Rendering used by export tables and the list view.
    pub fn display(&self) -> String {
        format!("{} – {}", self.min, self.max)
    }
}

/// A candidate composite material keyed by its unique name.
///
/// Records are never mutated in place; re-importing a name replaces the
/// whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub properties: BTreeMap<PropertyKind, RangeValue>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with(mut self, kind: PropertyKind, min: f64, max: f64) -> Self {
        self.properties.insert(kind, RangeValue::new(min, max));
        self
    }

    pub fn property(&self, kind: PropertyKind) -> Option<RangeValue> {
        self.properties.get(&kind).copied()
    }

    pub fn mean_of(&self, kind: PropertyKind) -> Option<f64> {
        self.property(kind).map(|range| range.mean())
    }

    /// Row view with every catalog property rendered, absent ones as "N/A".
    pub fn view(&self) -> MaterialView {
        let properties = PropertyKind::ALL
            .into_iter()
            .map(|kind| {
                let rendered = self
                    .property(kind)
                    .map(|range| range.display())
                    .unwrap_or_else(|| "N/A".to_string());
                (kind.label().to_string(), rendered)
            })
            .collect();

        MaterialView {
            name: self.name.clone(),
            properties,
        }
    }
}

/// Display-ready material row for API responses and CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialView {
    pub name: String,
    pub properties: BTreeMap<String, String>,
}
