//! Stock market data: live quotes from Finnhub and daily price history.

mod history;
mod quotes;
mod symbols;

pub use history::{
    compute_window, merge_rows, parse_chart, read_store, run_history, ChartClient, FetchWindow,
    HistoryError, HistoryOutcome, PriceRow,
};
pub use quotes::{quote_from_response, FinnhubQuote, Quote, QuoteClient, QuoteError, QuoteSnapshot};
pub use symbols::{finnhub_symbol, DEFAULT_SYMBOLS};
