//! Fertilizer Catalog
//!
//! Commercial products with nutrient mass fractions (0.0-1.0). Lookup is by
//! code or by any known name, ignoring case, accents and punctuation.

use crate::error::{RecommendationError, Result};
use crate::types::parse_decimal;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Phosphate,
    Potassic,
    Supplement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FertilizerProduct {
    pub code: &'static str,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub kind: ProductKind,
    pub p2o5: f64,
    pub k2o: f64,
    pub s: f64,
    pub n: f64,
    pub mo: f64,
}

// ============================================================================
// EMBEDDED CATALOG
// ============================================================================

pub static TSP: FertilizerProduct = FertilizerProduct {
    code: "TSP",
    name: "Triple superphosphate",
    aliases: &["Superfosfato triplo", "SFT"],
    kind: ProductKind::Phosphate,
    p2o5: 0.46,
    k2o: 0.0,
    s: 0.0,
    n: 0.0,
    mo: 0.0,
};

pub static SSP: FertilizerProduct = FertilizerProduct {
    code: "SSP",
    name: "Single superphosphate",
    aliases: &["Superfosfato simples", "SFS"],
    kind: ProductKind::Phosphate,
    p2o5: 0.18,
    k2o: 0.0,
    s: 0.12,
    n: 0.0,
    mo: 0.0,
};

pub static MAP: FertilizerProduct = FertilizerProduct {
    code: "MAP",
    name: "Monoammonium phosphate",
    aliases: &["Fosfato monoamônico"],
    kind: ProductKind::Phosphate,
    p2o5: 0.52,
    k2o: 0.0,
    s: 0.0,
    n: 0.11,
    mo: 0.0,
};

pub static DAP: FertilizerProduct = FertilizerProduct {
    code: "DAP",
    name: "Diammonium phosphate",
    aliases: &["Fosfato diamônico"],
    kind: ProductKind::Phosphate,
    p2o5: 0.46,
    k2o: 0.0,
    s: 0.0,
    n: 0.18,
    mo: 0.0,
};

pub static KCL: FertilizerProduct = FertilizerProduct {
    code: "KCl",
    name: "Potassium chloride",
    aliases: &["Cloreto de potássio", "Muriate of potash"],
    kind: ProductKind::Potassic,
    p2o5: 0.0,
    k2o: 0.60,
    s: 0.0,
    n: 0.0,
    mo: 0.0,
};

pub static K2SO4: FertilizerProduct = FertilizerProduct {
    code: "K2SO4",
    name: "Potassium sulfate",
    aliases: &["Sulfato de potássio"],
    kind: ProductKind::Potassic,
    p2o5: 0.0,
    k2o: 0.50,
    s: 0.18,
    n: 0.0,
    mo: 0.0,
};

pub static GYPSUM: FertilizerProduct = FertilizerProduct {
    code: "GYPSUM",
    name: "Agricultural gypsum",
    aliases: &["Gesso agrícola"],
    kind: ProductKind::Supplement,
    p2o5: 0.0,
    k2o: 0.0,
    s: 0.17,
    n: 0.0,
    mo: 0.0,
};

pub static SODIUM_MOLYBDATE: FertilizerProduct = FertilizerProduct {
    code: "NA2MOO4",
    name: "Sodium molybdate",
    aliases: &["Molibdato de sódio"],
    kind: ProductKind::Supplement,
    p2o5: 0.0,
    k2o: 0.0,
    s: 0.0,
    n: 0.0,
    mo: 0.39,
};

pub static CATALOG: &[&FertilizerProduct] =
    &[&TSP, &SSP, &MAP, &DAP, &KCL, &K2SO4, &GYPSUM, &SODIUM_MOLYBDATE];

// ============================================================================
// Lookup
// ============================================================================

/// Lowercase, strip accents and drop everything but letters and digits.
///
/// Accent folding only covers the Latin-1 vowels and cedilla used in
/// Portuguese product names.
pub fn normalize_name(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
            'ç' | 'Ç' => 'c',
            other => other.to_ascii_lowercase(),
        })
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

fn catalog_index() -> &'static FxHashMap<String, &'static FertilizerProduct> {
    static INDEX: OnceLock<FxHashMap<String, &'static FertilizerProduct>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut index = FxHashMap::default();
        for product in CATALOG.iter().copied() {
            index.insert(normalize_name(product.code), product);
            index.insert(normalize_name(product.name), product);
            for alias in product.aliases {
                index.insert(normalize_name(alias), product);
            }
        }
        index
    })
}

/// Find a product by code or name.
pub fn find_product(code_or_name: &str) -> Option<&'static FertilizerProduct> {
    catalog_index().get(&normalize_name(code_or_name)).copied()
}

/// Like `find_product`, but an unknown product is a configuration error.
pub fn resolve_product(code_or_name: &str) -> Result<&'static FertilizerProduct> {
    find_product(code_or_name)
        .ok_or_else(|| RecommendationError::unsupported("fertilizer product", code_or_name))
}

/// Find a product by code or name among phosphate sources only.
pub fn find_phosphate(code_or_name: &str) -> Option<&'static FertilizerProduct> {
    find_product(code_or_name).filter(|p| p.kind == ProductKind::Phosphate)
}

/// Find a product by code or name among potassium sources only.
pub fn find_potassic(code_or_name: &str) -> Option<&'static FertilizerProduct> {
    find_product(code_or_name).filter(|p| p.kind == ProductKind::Potassic)
}

// ============================================================================
// Formula grade
// ============================================================================

/// N-P₂O₅-K₂O grade of a formulated fertilizer, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormulaGrade {
    pub n: f64,
    pub p2o5: f64,
    pub k2o: f64,
}

impl FormulaGrade {
    pub fn new(n: f64, p2o5: f64, k2o: f64) -> Result<Self> {
        let grade = Self { n, p2o5, k2o };
        let in_range = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        if !(in_range(n) && in_range(p2o5) && in_range(k2o)) || n + p2o5 + k2o > 100.0 {
            return Err(RecommendationError::unsupported("formula grade", grade));
        }
        if p2o5 + k2o <= 0.0 {
            return Err(RecommendationError::unsupported("formula grade", grade));
        }
        Ok(grade)
    }

    /// Parse "05-20-20" style grades.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<Option<f64>> = raw.trim().split('-').map(parse_decimal).collect();
        match parts.as_slice() {
            [Some(n), Some(p), Some(k)] => Self::new(*n, *p, *k),
            _ => Err(RecommendationError::unsupported("formula grade", raw)),
        }
    }
}

impl std::fmt::Display for FormulaGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}-{:02}-{:02}", self.n, self.p2o5, self.k2o)
    }
}
