use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Balls in a full 20-over innings.
pub const INNINGS_BALLS: u16 = 120;
/// Balls in one over.
pub const BALLS_PER_OVER: u16 = 6;
/// Wickets available to the batting side.
pub const TOTAL_WICKETS: u8 = 10;

/// League logo shown next to the page title.
pub const IPL_LOGO: &str = "logos/ipl.svg";

/// An IPL franchise. Variants are declared in alphabetical order of their
/// display names so that the derived `Ord` matches the sorted select lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "Chennai Super Kings")]
    ChennaiSuperKings,
    #[serde(rename = "Delhi Capitals")]
    DelhiCapitals,
    #[serde(rename = "Gujarat Titans")]
    GujaratTitans,
    #[serde(rename = "Kolkata Knight Riders")]
    KolkataKnightRiders,
    #[serde(rename = "Lucknow Super Giants")]
    LucknowSuperGiants,
    #[serde(rename = "Mumbai Indians")]
    MumbaiIndians,
    #[serde(rename = "Punjab Kings")]
    PunjabKings,
    #[serde(rename = "Rajasthan Royals")]
    RajasthanRoyals,
    #[serde(rename = "Royal Challengers Bangalore")]
    RoyalChallengersBangalore,
    #[serde(rename = "Sunrisers Hyderabad")]
    SunrisersHyderabad,
}

impl Team {
    /// Every franchise, sorted by display name.
    pub const ALL: [Team; 10] = [
        Team::ChennaiSuperKings,
        Team::DelhiCapitals,
        Team::GujaratTitans,
        Team::KolkataKnightRiders,
        Team::LucknowSuperGiants,
        Team::MumbaiIndians,
        Team::PunjabKings,
        Team::RajasthanRoyals,
        Team::RoyalChallengersBangalore,
        Team::SunrisersHyderabad,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Team::ChennaiSuperKings => "Chennai Super Kings",
            Team::DelhiCapitals => "Delhi Capitals",
            Team::GujaratTitans => "Gujarat Titans",
            Team::KolkataKnightRiders => "Kolkata Knight Riders",
            Team::LucknowSuperGiants => "Lucknow Super Giants",
            Team::MumbaiIndians => "Mumbai Indians",
            Team::PunjabKings => "Punjab Kings",
            Team::RajasthanRoyals => "Rajasthan Royals",
            Team::RoyalChallengersBangalore => "Royal Challengers Bangalore",
            Team::SunrisersHyderabad => "Sunrisers Hyderabad",
        }
    }

    /// Logo asset path, relative to the served root.
    pub fn logo(&self) -> &'static str {
        match self {
            Team::ChennaiSuperKings => "logos/csk.svg",
            Team::DelhiCapitals => "logos/dc.svg",
            Team::GujaratTitans => "logos/gt.svg",
            Team::KolkataKnightRiders => "logos/kkr.svg",
            Team::LucknowSuperGiants => "logos/lsg.svg",
            Team::MumbaiIndians => "logos/mi.svg",
            Team::PunjabKings => "logos/pk.svg",
            Team::RajasthanRoyals => "logos/rr.svg",
            Team::RoyalChallengersBangalore => "logos/rcb.svg",
            Team::SunrisersHyderabad => "logos/sh.svg",
        }
    }

    /// Exact match on the display name first, then a case-insensitive one.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Team::ALL
            .iter()
            .find(|t| t.name() == name)
            .or_else(|| Team::ALL.iter().find(|t| t.name().eq_ignore_ascii_case(name)))
            .copied()
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Known host cities, sorted.
pub const CITIES: [&str; 33] = [
    "Abu Dhabi",
    "Ahmedabad",
    "Bangalore",
    "Bengaluru",
    "Bloemfontein",
    "Cape Town",
    "Centurion",
    "Chandigarh",
    "Chennai",
    "Cuttack",
    "Delhi",
    "Dharamsala",
    "Dubai",
    "Durban",
    "East London",
    "Guwahati",
    "Hyderabad",
    "Indore",
    "Jaipur",
    "Johannesburg",
    "Kimberley",
    "Kolkata",
    "Lucknow",
    "Mohali",
    "Mumbai",
    "Nagpur",
    "Navi Mumbai",
    "Port Elizabeth",
    "Pune",
    "Raipur",
    "Ranchi",
    "Sharjah",
    "Visakhapatnam",
];

/// A host city from [`CITIES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct City(&'static str);

impl City {
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        CITIES
            .iter()
            .find(|c| **c == name)
            .or_else(|| CITIES.iter().find(|c| c.eq_ignore_ascii_case(name)))
            .map(|c| City(*c))
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Overs completed, held at the form's one-decimal granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Overs {
    tenths: u16,
}

impl Overs {
    pub fn from_decimal(value: f64) -> Result<Self, InputError> {
        if !value.is_finite() || !(0.0..=20.0).contains(&value) {
            return Err(InputError::OversOutOfRange(value));
        }
        Ok(Overs {
            tenths: (value * 10.0).round() as u16,
        })
    }

    pub fn value(&self) -> f64 {
        self.tenths as f64 / 10.0
    }

    /// `120 - overs * 6`, floored to whole balls.
    pub fn balls_left(&self) -> u16 {
        (INNINGS_BALLS * 10).saturating_sub(self.tenths * BALLS_PER_OVER) / 10
    }

    pub fn is_zero(&self) -> bool {
        self.tenths == 0
    }
}

impl fmt::Display for Overs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tenths / 10, self.tenths % 10)
    }
}

/// Raw inputs as submitted by the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub batting_team: String,
    pub bowling_team: String,
    pub city: String,
    pub target: u32,
    pub score: u32,
    pub overs: f64,
    pub wickets: u8,
}

/// Raw input outside the domain the form allows.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("Unknown team: {0}")]
    UnknownTeam(String),
    #[error("Unknown host city: {0}")]
    UnknownCity(String),
    #[error("Target score must be at least 1.")]
    ZeroTarget,
    #[error("Overs completed must be between 0 and 20, got {0}.")]
    OversOutOfRange(f64),
    #[error("Wickets lost must be between 0 and 10, got {0}.")]
    WicketsOutOfRange(u8),
}

/// A second-innings match state for one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchContext {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    pub target: u32,
    pub score: u32,
    pub overs: Overs,
    pub wickets_lost: u8,
}

impl TryFrom<&PredictRequest> for MatchContext {
    type Error = InputError;

    fn try_from(req: &PredictRequest) -> Result<Self, Self::Error> {
        let batting_team = Team::from_name(&req.batting_team)
            .ok_or_else(|| InputError::UnknownTeam(req.batting_team.clone()))?;
        let bowling_team = Team::from_name(&req.bowling_team)
            .ok_or_else(|| InputError::UnknownTeam(req.bowling_team.clone()))?;
        let city =
            City::from_name(&req.city).ok_or_else(|| InputError::UnknownCity(req.city.clone()))?;
        if req.target == 0 {
            return Err(InputError::ZeroTarget);
        }
        let overs = Overs::from_decimal(req.overs)?;
        if req.wickets > TOTAL_WICKETS {
            return Err(InputError::WicketsOutOfRange(req.wickets));
        }
        Ok(MatchContext {
            batting_team,
            bowling_team,
            city,
            target: req.target,
            score: req.score,
            overs,
            wickets_lost: req.wickets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn request() -> PredictRequest {
        PredictRequest {
            batting_team: "Mumbai Indians".into(),
            bowling_team: "Chennai Super Kings".into(),
            city: "Mumbai".into(),
            target: 180,
            score: 100,
            overs: 12.0,
            wickets: 3,
        }
    }

    #[test]
    fn team_names_round_trip() {
        for team in Team::ALL {
            assert_eq!(Team::from_name(team.name()), Some(team));
        }
        assert_eq!(
            Team::from_name("  royal challengers bangalore "),
            Some(Team::RoyalChallengersBangalore)
        );
        assert_eq!(Team::from_name("Deccan Chargers"), None);
    }

    #[test]
    fn teams_are_sorted_and_logos_distinct() {
        assert!(Team::ALL.windows(2).all(|w| w[0].name() < w[1].name()));
        assert!(Team::ALL.windows(2).all(|w| w[0] < w[1]));
        let logos: HashSet<_> = Team::ALL.iter().map(|t| t.logo()).collect();
        assert_eq!(logos.len(), Team::ALL.len());
    }

    #[test]
    fn logo_assets_ship_with_the_crate() {
        let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
        for logo in Team::ALL.iter().map(|t| t.logo()).chain([IPL_LOGO]) {
            assert!(root.join(logo).is_file(), "missing {}", logo);
        }
    }

    #[test]
    fn team_serializes_as_display_name() {
        let json = serde_json::to_string(&Team::SunrisersHyderabad).unwrap();
        assert_eq!(json, "\"Sunrisers Hyderabad\"");
    }

    #[test]
    fn cities_are_sorted_and_unique() {
        assert!(CITIES.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(City::from_name("navi mumbai").map(|c| c.name()), Some("Navi Mumbai"));
        assert_eq!(City::from_name("Wankhede"), None);
    }

    #[test]
    fn overs_floor_to_whole_balls_left() {
        assert_eq!(Overs::from_decimal(12.0).unwrap().balls_left(), 48);
        assert_eq!(Overs::from_decimal(12.3).unwrap().balls_left(), 46);
        assert_eq!(Overs::from_decimal(0.1).unwrap().balls_left(), 119);
        assert_eq!(Overs::from_decimal(20.0).unwrap().balls_left(), 0);
        assert!(Overs::from_decimal(0.0).unwrap().is_zero());
        assert_eq!(Overs::from_decimal(12.3).unwrap().to_string(), "12.3");
    }

    #[test]
    fn any_one_decimal_overs_in_range_is_accepted() {
        let overs = Overs::from_decimal(12.7).unwrap();
        assert_eq!(overs.value(), 12.7);
        assert_eq!(overs.balls_left(), 43);
        assert!(Overs::from_decimal(19.9).is_ok());
    }

    #[test]
    fn overs_outside_the_innings_are_rejected() {
        assert_eq!(Overs::from_decimal(20.1), Err(InputError::OversOutOfRange(20.1)));
        assert_eq!(Overs::from_decimal(-0.1), Err(InputError::OversOutOfRange(-0.1)));
        assert!(Overs::from_decimal(f64::NAN).is_err());
    }

    #[test]
    fn request_converts_to_context() {
        let ctx = MatchContext::try_from(&request()).unwrap();
        assert_eq!(ctx.batting_team, Team::MumbaiIndians);
        assert_eq!(ctx.bowling_team, Team::ChennaiSuperKings);
        assert_eq!(ctx.city.name(), "Mumbai");
        assert_eq!(ctx.overs.balls_left(), 48);
        assert_eq!(ctx.wickets_lost, 3);
    }

    #[test]
    fn request_domain_errors() {
        let mut req = request();
        req.batting_team = "Kochi Tuskers".into();
        assert_eq!(
            MatchContext::try_from(&req),
            Err(InputError::UnknownTeam("Kochi Tuskers".into()))
        );

        let mut req = request();
        req.city = "Lord's".into();
        assert_eq!(
            MatchContext::try_from(&req),
            Err(InputError::UnknownCity("Lord's".into()))
        );

        let mut req = request();
        req.target = 0;
        assert_eq!(MatchContext::try_from(&req), Err(InputError::ZeroTarget));

        let mut req = request();
        req.wickets = 11;
        assert_eq!(MatchContext::try_from(&req), Err(InputError::WicketsOutOfRange(11)));
    }

    #[test]
    fn ten_wickets_is_left_for_validation() {
        let mut req = request();
        req.wickets = 10;
        assert_eq!(MatchContext::try_from(&req).unwrap().wickets_lost, 10);
    }
}
