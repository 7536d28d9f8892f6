//! Named-field view over one delimited log row.

/// One log line keyed by column name, in header order.
///
/// Values are trimmed and empty values are left out, so `get` only ever
/// returns meaningful text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: Vec<(String, String)>,
}

impl RawRecord {
    /// Pairs headers with values position by position. Columns past the end
    /// of the shorter side are ignored.
    pub fn from_fields<H, V>(headers: H, values: V) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let fields = headers
            .into_iter()
            .zip(values)
            .filter_map(|(header, value)| {
                let header = clean_header(header.as_ref());
                let value = value.as_ref().trim();
                if value.is_empty() {
                    None
                } else {
                    Some((header.to_string(), value.to_string()))
                }
            })
            .collect();

        Self { fields }
    }

    /// Value of the named column. If the header repeats, the last column wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(header, _)| header == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }
}

// spreadsheet exports put a BOM in front of the first header
fn clean_header(header: &str) -> &str {
    header.trim().trim_start_matches('\u{feff}').trim()
}
