//! Control commands embedded in chat messages

const FETCH_TOP_STOCKS: &str = "#fetch-top-stocks:";

/// A client instruction that bypasses the model
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCommand {
    /// `#fetch-top-stocks:<sector>`
    FetchTopStocks { sector: String },
}

impl ControlCommand {
    /// Classify a message body. Plain conversation yields `None`.
    pub fn parse(content: &str) -> Option<Self> {
        let content = content.trim();
        if !content.starts_with(FETCH_TOP_STOCKS) {
            return None;
        }

        let sector = content
            .split_once(':')
            .map(|(_, rest)| rest.trim())
            .unwrap_or_default();
        Some(ControlCommand::FetchTopStocks {
            sector: sector.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_top_stocks() {
        assert_eq!(
            ControlCommand::parse("  #fetch-top-stocks: tech  "),
            Some(ControlCommand::FetchTopStocks { sector: "tech".into() })
        );
    }

    #[test]
    fn test_sector_keeps_later_colons() {
        assert_eq!(
            ControlCommand::parse("#fetch-top-stocks:consumer goods: fmcg"),
            Some(ControlCommand::FetchTopStocks { sector: "consumer goods: fmcg".into() })
        );
    }

    #[test]
    fn test_empty_sector() {
        assert_eq!(
            ControlCommand::parse("#fetch-top-stocks:"),
            Some(ControlCommand::FetchTopStocks { sector: String::new() })
        );
    }

    #[test]
    fn test_plain_messages() {
        assert_eq!(ControlCommand::parse("What should I invest in?"), None);
        assert_eq!(ControlCommand::parse("tell me about #fetch-top-stocks:tech"), None);
        assert_eq!(ControlCommand::parse("#FETCH-TOP-STOCKS:tech"), None);
    }
}
