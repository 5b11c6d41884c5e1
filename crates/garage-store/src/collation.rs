//! Accent- and case-insensitive ordering for vehicle lists

use std::cmp::Ordering;

use garage_domain::Vehicle;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// `Ônix` sorts with `onix`, before `Palio`
fn collation_key(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn compare_models(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Sort vehicles by model name the way a pt-BR user expects
pub fn sort_by_model(vehicles: &mut [Vehicle]) {
    vehicles.sort_by(|a, b| compare_models(a.model(), b.model()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accents_and_case_ignored() {
        let mut vehicles = vec![
            Vehicle::base("Palio", "Azul").unwrap(),
            Vehicle::base("Ônix", "Preto").unwrap(),
            Vehicle::base("corolla", "Prata").unwrap(),
            Vehicle::base("Civic", "Branco").unwrap(),
        ];
        sort_by_model(&mut vehicles);
        let models: Vec<_> = vehicles.iter().map(|v| v.model()).collect();
        assert_eq!(models, vec!["Civic", "corolla", "Ônix", "Palio"]);
    }
}
