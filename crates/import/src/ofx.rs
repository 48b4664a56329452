use chrono::NaiveDate;
use extrato_core::{AccountKind, Money, TransactionRecord};
use std::fmt;

/// Source exports carry no time of day, so every timestamp is local noon in
/// Brasília.
pub const TIME_SUFFIX: &str = "120000[-3:BRT]";
pub const CURRENCY: &str = "BRL";
pub const BANK_ID: &str = "000";
pub const CHECKING_ACCOUNT_ID: &str = "CONTA-FINAL-0000";
pub const CARD_ACCOUNT_ID: &str = "CARTAO-FINAL-0000";
pub const LEDGER_BALANCE: &str = "0.00";
pub const LANGUAGE: &str = "POR";

const OFX_DATE: &str = "%Y%m%d";
const STATUS_OK: &str = "<STATUS><CODE>0</CODE><SEVERITY>INFO</SEVERITY></STATUS>";

const SGML_HEADER: &str = "\
OFXHEADER:100
DATA:OFXSGML
VERSION:102
SECURITY:NONE
ENCODING:USASCII
CHARSET:1252
COMPRESSION:NONE
OLDFILEUID:NONE
NEWFILEUID:NONE
";

/// `YYYYMMDD`
struct OfxDate(NaiveDate);

impl fmt::Display for OfxDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(OFX_DATE))
    }
}

/// `YYYYMMDD120000[-3:BRT]`
struct OfxTimestamp(NaiveDate);

impl fmt::Display for OfxTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{TIME_SUFFIX}", OfxDate(self.0))
    }
}

/// Protocol header, `<OFX>` and the sign-on response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignOn {
    pub server_date: NaiveDate,
}

impl fmt::Display for SignOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{SGML_HEADER}")?;
        writeln!(f, "<OFX>")?;
        writeln!(
            f,
            "<SIGNONMSGSRSV1><SONRS>{STATUS_OK}<DTSERVER>{}</DTSERVER><LANGUAGE>{LANGUAGE}</LANGUAGE></SONRS></SIGNONMSGSRSV1>",
            OfxTimestamp(self.server_date)
        )
    }
}

/// Statement wrapper; one variant per [`AccountKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEnvelope {
    Bank,
    CreditCard,
}

impl AccountEnvelope {
    pub fn for_kind(kind: AccountKind) -> Self {
        match kind {
            AccountKind::Checking => AccountEnvelope::Bank,
            AccountKind::CreditCard => AccountEnvelope::CreditCard,
        }
    }

    pub fn open(self) -> String {
        match self {
            AccountEnvelope::Bank => format!(
                "<BANKMSGSRSV1><STMTTRNRS><TRNUID>1</TRNUID>{STATUS_OK}<STMTRS><CURDEF>{CURRENCY}</CURDEF>\
                 <BANKACCTFROM><BANKID>{BANK_ID}</BANKID><ACCTID>{CHECKING_ACCOUNT_ID}</ACCTID><ACCTTYPE>CHECKING</ACCTTYPE></BANKACCTFROM>"
            ),
            AccountEnvelope::CreditCard => format!(
                "<CREDITCARDMSGSRSV1><CCSTMTTRNRS><TRNUID>1</TRNUID>{STATUS_OK}<CCSTMTRS><CURDEF>{CURRENCY}</CURDEF>\
                 <CCACCTFROM><ACCTID>{CARD_ACCOUNT_ID}</ACCTID></CCACCTFROM>"
            ),
        }
    }

    pub fn close(self) -> &'static str {
        match self {
            AccountEnvelope::Bank => "</STMTRS></STMTTRNRS></BANKMSGSRSV1>",
            AccountEnvelope::CreditCard => "</CCSTMTRS></CCSTMTTRNRS></CREDITCARDMSGSRSV1>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    /// Zero counts as a debit.
    pub fn for_amount(amount: Money) -> Self {
        if amount.is_positive() {
            TransactionType::Credit
        } else {
            TransactionType::Debit
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Credit => write!(f, "CREDIT"),
            TransactionType::Debit => write!(f, "DEBIT"),
        }
    }
}

/// One `<STMTTRN>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementTransaction<'a> {
    pub kind: TransactionType,
    pub posted: NaiveDate,
    pub amount: Money,
    pub fit_id: &'a str,
    /// Written as-is; markup characters are not escaped.
    pub memo: &'a str,
}

impl<'a> From<&'a TransactionRecord> for StatementTransaction<'a> {
    fn from(record: &'a TransactionRecord) -> Self {
        StatementTransaction {
            kind: TransactionType::for_amount(record.amount),
            posted: record.date,
            amount: record.amount,
            fit_id: &record.fit_id,
            memo: &record.description,
        }
    }
}

impl fmt::Display for StatementTransaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<STMTTRN><TRNTYPE>{}</TRNTYPE><DTPOSTED>{}</DTPOSTED><TRNAMT>{}</TRNAMT><FITID>{}</FITID><MEMO>{}</MEMO></STMTTRN>",
            self.kind,
            OfxTimestamp(self.posted),
            self.amount,
            self.fit_id,
            self.memo
        )
    }
}

/// `<BANKTRANLIST>` with its date bounds and one line per transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionList<'a> {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub transactions: Vec<StatementTransaction<'a>>,
}

impl fmt::Display for TransactionList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<BANKTRANLIST><DTSTART>{}</DTSTART><DTEND>{}</DTEND>",
            OfxDate(self.start),
            OfxDate(self.end)
        )?;
        for trn in &self.transactions {
            write!(f, "\n{trn}")?;
        }
        write!(f, "\n</BANKTRANLIST>")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerBalance {
    pub as_of: NaiveDate,
}

impl fmt::Display for LedgerBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<LEDGERBAL><BALAMT>{LEDGER_BALANCE}</BALAMT><DTASOF>{}</DTASOF></LEDGERBAL>",
            OfxTimestamp(self.as_of)
        )
    }
}

/// A complete statement. Rendering through `Display` produces the exact file
/// contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfxDocument<'a> {
    pub sign_on: SignOn,
    pub envelope: AccountEnvelope,
    pub list: TransactionList<'a>,
    pub ledger: LedgerBalance,
}

impl<'a> OfxDocument<'a> {
    /// `records` must already be sorted by date: the first and last entries
    /// give the list bounds, and the last one is the server date. Returns
    /// `None` when there is nothing to emit.
    pub fn from_records(records: &'a [TransactionRecord], kind: AccountKind) -> Option<Self> {
        let first = records.first()?;
        let last = records.last()?;

        Some(OfxDocument {
            sign_on: SignOn {
                server_date: last.date,
            },
            envelope: AccountEnvelope::for_kind(kind),
            list: TransactionList {
                start: first.date,
                end: last.date,
                transactions: records.iter().map(StatementTransaction::from).collect(),
            },
            ledger: LedgerBalance { as_of: last.date },
        })
    }
}

impl fmt::Display for OfxDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.sign_on)?;
        writeln!(f, "{}", self.envelope.open())?;
        writeln!(f, "{}", self.list)?;
        writeln!(f, "{}", self.ledger)?;
        writeln!(f, "{}", self.envelope.close())?;
        write!(f, "</OFX>")
    }
}

/// Renders `records` as OFX text, or an empty string when there are none.
pub fn build(records: &[TransactionRecord], kind: AccountKind) -> String {
    OfxDocument::from_records(records, kind)
        .map(|doc| doc.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(d: NaiveDate, description: &str, cents: i64, position: usize) -> TransactionRecord {
        TransactionRecord::new(d, description.to_string(), Money::from_cents(cents), position)
    }

    fn tag<'s>(doc: &'s str, name: &str) -> Vec<&'s str> {
        let open = format!("<{name}>");
        let close = format!("</{name}>");
        doc.match_indices(&open)
            .filter_map(|(i, _)| {
                let rest = &doc[i + open.len()..];
                rest.find(&close).map(|end| &rest[..end])
            })
            .collect()
    }

    // ── empty input ───────────────────────────────────────────────────────────

    #[test]
    fn empty_records_build_nothing() {
        assert!(OfxDocument::from_records(&[], AccountKind::Checking).is_none());
        assert_eq!(build(&[], AccountKind::CreditCard), "");
    }

    // ── exact layout ──────────────────────────────────────────────────────────

    #[test]
    fn checking_document_layout() {
        let records = vec![record(date(2024, 3, 1), "Pagamento recebido", 150000, 0)];
        let fit_id = records[0].fit_id.clone();
        let doc = build(&records, AccountKind::Checking);

        let expected = format!(
            "OFXHEADER:100\n\
             DATA:OFXSGML\n\
             VERSION:102\n\
             SECURITY:NONE\n\
             ENCODING:USASCII\n\
             CHARSET:1252\n\
             COMPRESSION:NONE\n\
             OLDFILEUID:NONE\n\
             NEWFILEUID:NONE\n\
             \n\
             <OFX>\n\
             <SIGNONMSGSRSV1><SONRS><STATUS><CODE>0</CODE><SEVERITY>INFO</SEVERITY></STATUS><DTSERVER>20240301120000[-3:BRT]</DTSERVER><LANGUAGE>POR</LANGUAGE></SONRS></SIGNONMSGSRSV1>\n\
             \n\
             <BANKMSGSRSV1><STMTTRNRS><TRNUID>1</TRNUID><STATUS><CODE>0</CODE><SEVERITY>INFO</SEVERITY></STATUS><STMTRS><CURDEF>BRL</CURDEF><BANKACCTFROM><BANKID>000</BANKID><ACCTID>CONTA-FINAL-0000</ACCTID><ACCTTYPE>CHECKING</ACCTTYPE></BANKACCTFROM>\n\
             <BANKTRANLIST><DTSTART>20240301</DTSTART><DTEND>20240301</DTEND>\n\
             <STMTTRN><TRNTYPE>CREDIT</TRNTYPE><DTPOSTED>20240301120000[-3:BRT]</DTPOSTED><TRNAMT>1500.00</TRNAMT><FITID>{fit_id}</FITID><MEMO>Pagamento recebido</MEMO></STMTTRN>\n\
             </BANKTRANLIST>\n\
             <LEDGERBAL><BALAMT>0.00</BALAMT><DTASOF>20240301120000[-3:BRT]</DTASOF></LEDGERBAL>\n\
             </STMTRS></STMTTRNRS></BANKMSGSRSV1>\n\
             </OFX>"
        );
        assert_eq!(doc, expected);
    }

    #[test]
    fn credit_card_envelope() {
        let records = vec![record(date(2024, 3, 1), "Pagamento recebido", -150000, 0)];
        let doc = build(&records, AccountKind::CreditCard);

        assert!(doc.contains(
            "<CREDITCARDMSGSRSV1><CCSTMTTRNRS><TRNUID>1</TRNUID><STATUS><CODE>0</CODE><SEVERITY>INFO</SEVERITY></STATUS><CCSTMTRS><CURDEF>BRL</CURDEF><CCACCTFROM><ACCTID>CARTAO-FINAL-0000</ACCTID></CCACCTFROM>\n<BANKTRANLIST>"
        ));
        assert!(doc.ends_with("</CCSTMTRS></CCSTMTTRNRS></CREDITCARDMSGSRSV1>\n</OFX>"));
        assert!(!doc.contains("BANKMSGSRSV1"));
        assert_eq!(tag(&doc, "TRNTYPE"), ["DEBIT"]);
        assert_eq!(tag(&doc, "TRNAMT"), ["-1500.00"]);
    }

    #[test]
    fn checking_envelope_has_no_card_tags() {
        let records = vec![record(date(2024, 3, 1), "x", 100, 0)];
        let doc = build(&records, AccountKind::Checking);
        assert!(!doc.contains("CREDITCARDMSGSRSV1"));
        assert_eq!(tag(&doc, "ACCTTYPE"), ["CHECKING"]);
    }

    // ── structure ─────────────────────────────────────────────────────────────

    #[test]
    fn list_bounds_follow_first_and_last_record() {
        let records = vec![
            record(date(2024, 1, 5), "a", 100, 0),
            record(date(2024, 1, 20), "b", -200, 1),
            record(date(2024, 2, 2), "c", 300, 2),
        ];
        let doc = build(&records, AccountKind::Checking);
        assert_eq!(tag(&doc, "DTSTART"), ["20240105"]);
        assert_eq!(tag(&doc, "DTEND"), ["20240202"]);
        assert_eq!(tag(&doc, "DTSERVER"), ["20240202120000[-3:BRT]"]);
        assert_eq!(tag(&doc, "DTASOF"), ["20240202120000[-3:BRT]"]);
        assert_eq!(tag(&doc, "BALAMT"), ["0.00"]);
        assert_eq!(tag(&doc, "STMTTRN").len(), 3);
    }

    #[test]
    fn transactions_keep_record_order_and_ids() {
        let records = vec![
            record(date(2024, 1, 5), "first", 100, 0),
            record(date(2024, 1, 5), "second", 100, 1),
        ];
        let doc = build(&records, AccountKind::Checking);
        assert_eq!(tag(&doc, "MEMO"), ["first", "second"]);
        assert_eq!(
            tag(&doc, "FITID"),
            [records[0].fit_id.as_str(), records[1].fit_id.as_str()]
        );
    }

    #[test]
    fn zero_amount_is_debit() {
        let records = vec![record(date(2024, 1, 5), "zero", 0, 0)];
        let doc = build(&records, AccountKind::Checking);
        assert_eq!(tag(&doc, "TRNTYPE"), ["DEBIT"]);
        assert_eq!(tag(&doc, "TRNAMT"), ["0.00"]);
    }

    #[test]
    fn memo_is_written_verbatim() {
        let records = vec![record(date(2024, 1, 5), "Café & Cia", -1234, 0)];
        let doc = build(&records, AccountKind::Checking);
        assert_eq!(tag(&doc, "MEMO"), ["Café & Cia"]);
    }

    #[test]
    fn blocks_render_independently() {
        let trn = StatementTransaction {
            kind: TransactionType::Debit,
            posted: date(2024, 12, 31),
            amount: Money::from_cents(-5),
            fit_id: "abc",
            memo: "m",
        };
        assert_eq!(
            trn.to_string(),
            "<STMTTRN><TRNTYPE>DEBIT</TRNTYPE><DTPOSTED>20241231120000[-3:BRT]</DTPOSTED><TRNAMT>-0.05</TRNAMT><FITID>abc</FITID><MEMO>m</MEMO></STMTTRN>"
        );
        let ledger = LedgerBalance { as_of: date(2024, 12, 31) };
        assert_eq!(
            ledger.to_string(),
            "<LEDGERBAL><BALAMT>0.00</BALAMT><DTASOF>20241231120000[-3:BRT]</DTASOF></LEDGERBAL>"
        );
        assert_eq!(AccountEnvelope::for_kind(AccountKind::CreditCard), AccountEnvelope::CreditCard);
    }
}
