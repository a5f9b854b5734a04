pub const UNKNOWN_TEAM: &str = "Unknown";
pub const MIN_FIELDS: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub rank: u32,
    pub player: String,
    pub team: String,
    pub values: TierValues,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierValues {
    pub common: u64,
    pub uncommon: u64,
    pub rare: u64,
    pub epic: u64,
    pub legendary: u64,
    pub mystic: u64,
    pub iconic: u64,
}

impl TierValues {
    pub fn get(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Common => self.common,
            Tier::Uncommon => self.uncommon,
            Tier::Rare => self.rare,
            Tier::Epic => self.epic,
            Tier::Legendary => self.legendary,
            Tier::Mystic => self.mystic,
            Tier::Iconic => self.iconic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mystic,
    Iconic,
}

impl Tier {
    pub const ALL: [Tier; 7] = [
        Tier::Common,
        Tier::Uncommon,
        Tier::Rare,
        Tier::Epic,
        Tier::Legendary,
        Tier::Mystic,
        Tier::Iconic,
    ];
}

pub fn tier_label(tier: Tier) -> &'static str {
    match tier {
        Tier::Common => "Common",
        Tier::Uncommon => "Uncommon",
        Tier::Rare => "Rare",
        Tier::Epic => "Epic",
        Tier::Legendary => "Legendary",
        Tier::Mystic => "Mystic",
        Tier::Iconic => "Iconic",
    }
}

/// Parses the raw CSV text into ranked rows.
///
/// The first line is a header and is skipped. Blank lines and lines with
/// fewer than [`MIN_FIELDS`] comma-separated fields are dropped without
/// notice. Rank is the 1-based position among the rows that survive.
pub fn parse_rows(raw: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    for line in raw.split('\n').skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(clean_field).collect();
        if fields.len() < MIN_FIELDS {
            continue;
        }
        let rank = u32::try_from(rows.len() + 1).unwrap_or(u32::MAX);
        rows.push(build_row(rank, &fields));
    }
    rows
}

fn build_row(rank: u32, fields: &[&str]) -> Row {
    let player = fields[0].to_string();
    let team = resolve_team(fields[1], &player);
    Row {
        rank,
        player,
        team,
        values: TierValues {
            common: parse_value(fields[2]),
            uncommon: parse_value(fields[3]),
            rare: parse_value(fields[4]),
            epic: parse_value(fields[5]),
            legendary: parse_value(fields[6]),
            mystic: parse_value(fields[7]),
            iconic: parse_value(fields[8]),
        },
    }
}

fn clean_field(raw: &str) -> &str {
    raw.trim().trim_matches(['"', '\'']).trim()
}

/// The CSV team column wins; otherwise the first parenthesized group of the
/// player name; otherwise [`UNKNOWN_TEAM`].
pub fn resolve_team(field: &str, player: &str) -> String {
    if !field.is_empty() {
        return field.to_string();
    }
    extract_team_name(player)
        .unwrap_or(UNKNOWN_TEAM)
        .to_string()
}

/// Content of the first `( … )` group in a player name.
pub fn extract_team_name(player: &str) -> Option<&str> {
    let open = player.find('(')?;
    let rest = &player[open + 1..];
    let close = rest.find(')')?;
    Some(&rest[..close])
}

/// Lenient non-negative integer parse.
///
/// Thousands separators and quotes are removed, then the leading run of
/// digits is read. Anything that does not start with a digit (after an
/// optional `+`) becomes 0, including negative numbers. A digit run too
/// large for `u64` saturates to `u64::MAX`.
pub fn parse_value(raw: &str) -> u64 {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, ',' | '"' | '\'')).collect();
    let trimmed = cleaned.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..digits_end];
    if digits.is_empty() {
        return 0;
    }
    digits.parse::<u64>().unwrap_or(u64::MAX)
}

pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
