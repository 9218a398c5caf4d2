// ============================================================================
// Formatage des nombres pour l'affichage
// ============================================================================
// - Prix : groupement en-US, 2 décimales ("$45,230.50")
// - Grandes valeurs : suffixe B / M ("$885.00B", "$4.50M")
// - Variation : flèche + valeur absolue ("▼ 1.23%")
//
// CONCEPT : arrondi au plus proche, égalité loin de zéro (0.125 -> 0.13).
// Le formatage {:.2} des f64 arrondit les égalités au pair, d'où Decimal.
// ============================================================================

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Trend;

const BILLION: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);
const MILLION: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Arrondit à `decimals` chiffres et fixe l'échelle (885 -> 885.00)
fn round_fixed(value: Decimal, decimals: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimals);
    rounded
}

/// Formate un nombre avec séparateurs de milliers et décimales fixes
///
/// # Exemple
/// format_number(Decimal::new(452305, 1), 2) == "45,230.50"
pub fn format_number(value: Decimal, decimals: u32) -> String {
    let rounded = round_fixed(value.abs(), decimals);
    let fixed = rounded.to_string();

    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = group_thousands(int_part);

    // "-0.00" n'a pas de sens à l'affichage
    if value.is_sign_negative() && !rounded.is_zero() {
        grouped.insert(0, '-');
    }

    match frac_part {
        Some(frac) => format!("{}.{}", grouped, frac),
        None => grouped,
    }
}

/// Insère une virgule toutes les 3 positions en partant de la droite
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Prix en dollars, 2 décimales groupées
pub fn format_price(value: Decimal) -> String {
    format!("${}", format_number(value, 2))
}

/// Capitalisation / volume avec suffixe d'unité
pub fn format_large_number(value: Decimal) -> String {
    if value >= BILLION {
        format!("${}B", round_fixed(value / BILLION, 2))
    } else if value >= MILLION {
        format!("${}M", round_fixed(value / MILLION, 2))
    } else {
        format!("${}", format_number(value, 0))
    }
}

/// Variation sur 24h : classification + texte sans signe
pub fn format_change(change: Decimal) -> (Trend, String) {
    let trend = Trend::from_change(change);
    (trend, format!("{} {}%", trend.glyph(), round_fixed(change.abs(), 2)))
}

/// Variante pour les champs optionnels (null côté API)
pub fn format_optional(value: Option<Decimal>, formatter: fn(Decimal) -> String) -> String {
    value.map(formatter).unwrap_or_else(|| "N/A".to_string())
}
