/// Franchise companies and market indices tracked by the ticker and charts.
#[rustfmt::skip]
pub const DEFAULT_SYMBOLS: [&str; 41] = [
    // Market indices
    "^GSPC", "^IXIC", "^DJI",
    // Quick service and restaurants
    "MCD", "YUM", "QSR", "WEN", "DPZ", "JACK", "WING", "SHAK", "CAVA", "DENN", "DIN", "DNUT",
    "NATH", "RRGB",
    // Auto and services
    "DRVN", "HRB", "CAR", "UHAL",
    // Fitness
    "PLNT", "BFT",
    // Hospitality
    "MAR", "HLT", "H", "CHH", "WH", "IHG", "VAC", "TNL", "CWH",
    // Retail and other
    "GNC", "RENT", "SERV", "ROL", "ADUS", "LOPE", "PLAY", "ARCO", "TAST",
];

/// Finnhub names indices differently from the Yahoo-style symbols used
/// everywhere else.
const FINNHUB_ALIASES: [(&str, &str); 3] = [("^GSPC", "SPX"), ("^IXIC", "COMP"), ("^DJI", "DJI")];

/// Symbol to send to Finnhub for a tracked symbol.
pub fn finnhub_symbol(symbol: &str) -> &str {
    FINNHUB_ALIASES
        .iter()
        .find(|(yahoo, _)| *yahoo == symbol)
        .map(|(_, finnhub)| *finnhub)
        .unwrap_or(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_aliases() {
        assert_eq!(finnhub_symbol("^GSPC"), "SPX");
        assert_eq!(finnhub_symbol("^IXIC"), "COMP");
        assert_eq!(finnhub_symbol("^DJI"), "DJI");
    }

    #[test]
    fn test_plain_symbols_unchanged() {
        assert_eq!(finnhub_symbol("MCD"), "MCD");
        assert_eq!(finnhub_symbol("H"), "H");
    }

    #[test]
    fn test_default_symbols_unique() {
        let mut sorted = DEFAULT_SYMBOLS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), DEFAULT_SYMBOLS.len());
    }
}
