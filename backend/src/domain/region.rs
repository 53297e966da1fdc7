//! Target regions (Japanese prefectures).
//!
//! Projects filter their candidate pool by a set of prefectures, and every
//! place carries the prefecture it belongs to, either supplied when saved or
//! derived from its formatted address.

use serde::{Deserialize, Serialize};

/// All 47 prefectures in JIS X 0401 order.
pub const PREFECTURES: [&str; 47] = [
    "北海道",
    "青森県",
    "岩手県",
    "宮城県",
    "秋田県",
    "山形県",
    "福島県",
    "茨城県",
    "栃木県",
    "群馬県",
    "埼玉県",
    "千葉県",
    "東京都",
    "神奈川県",
    "新潟県",
    "富山県",
    "石川県",
    "福井県",
    "山梨県",
    "長野県",
    "岐阜県",
    "静岡県",
    "愛知県",
    "三重県",
    "滋賀県",
    "京都府",
    "大阪府",
    "兵庫県",
    "奈良県",
    "和歌山県",
    "鳥取県",
    "島根県",
    "岡山県",
    "広島県",
    "山口県",
    "徳島県",
    "香川県",
    "愛媛県",
    "高知県",
    "福岡県",
    "佐賀県",
    "長崎県",
    "熊本県",
    "大分県",
    "宮崎県",
    "鹿児島県",
    "沖縄県",
];

/// Raised when a name is not one of [`PREFECTURES`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown prefecture: {value}")]
pub struct UnknownPrefecture {
    pub value: String,
}

/// A validated prefecture name.
///
/// # Examples
/// ```
/// use tripboard::domain::Prefecture;
///
/// let tokyo = Prefecture::new("東京都").expect("known prefecture");
/// assert_eq!(tokyo.as_str(), "東京都");
/// assert!(Prefecture::new("Atlantis").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Prefecture(&'static str);

impl Prefecture {
    /// Validate a prefecture name after trimming surrounding whitespace.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UnknownPrefecture> {
        let trimmed = raw.as_ref().trim();
        PREFECTURES
            .iter()
            .copied()
            .find(|name| *name == trimmed)
            .map(Self)
            .ok_or_else(|| UnknownPrefecture {
                value: raw.as_ref().to_owned(),
            })
    }

    /// Derive the prefecture from a formatted address.
    ///
    /// Returns the prefecture whose name appears earliest in the address, so
    /// `"日本、〒100-0005 東京都千代田区丸の内1丁目"` yields `東京都`.
    pub fn from_address(address: &str) -> Option<Self> {
        PREFECTURES
            .iter()
            .copied()
            .filter_map(|name| address.find(name).map(|position| (position, name)))
            .min_by_key(|(position, _)| *position)
            .map(|(_, name)| Self(name))
    }

    /// Borrow the prefecture name.
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Prefecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl From<Prefecture> for String {
    fn from(value: Prefecture) -> Self {
        value.0.to_owned()
    }
}

impl TryFrom<String> for Prefecture {
    type Error = UnknownPrefecture;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Parse and de-duplicate a list of prefecture names, preserving first-seen
/// order. Fails on the first unknown name, reporting its index.
pub fn parse_prefectures<I, S>(values: I) -> Result<Vec<Prefecture>, (usize, UnknownPrefecture)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed: Vec<Prefecture> = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        let prefecture = Prefecture::new(value).map_err(|err| (index, err))?;
        if !parsed.contains(&prefecture) {
            parsed.push(prefecture);
        }
    }
    Ok(parsed)
}
