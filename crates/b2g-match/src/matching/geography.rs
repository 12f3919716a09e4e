//! Brazilian federative units, their land borders and macro-regions.
//!
//! Everything here is `const` data: the tables are shared by every scoring
//! thread without synchronization.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FederativeUnit {
    AC,
    AL,
    AP,
    AM,
    BA,
    CE,
    DF,
    ES,
    GO,
    MA,
    MT,
    MS,
    MG,
    PA,
    PB,
    PR,
    PE,
    PI,
    RJ,
    RN,
    RS,
    RO,
    RR,
    SC,
    SP,
    SE,
    TO,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Region {
    North,
    Northeast,
    CenterWest,
    Southeast,
    South,
}

impl Region {
    pub const fn label(self) -> &'static str {
        match self {
            Region::North => "Norte",
            Region::Northeast => "Nordeste",
            Region::CenterWest => "Centro-Oeste",
            Region::Southeast => "Sudeste",
            Region::South => "Sul",
        }
    }
}

use FederativeUnit::*;

impl FederativeUnit {
    pub const ALL: [FederativeUnit; 27] = [
        AC, AL, AP, AM, BA, CE, DF, ES, GO, MA, MT, MS, MG, PA, PB, PR, PE, PI, RJ, RN, RS, RO, RR,
        SC, SP, SE, TO,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|unit| unit.code() == code)
    }

    pub const fn code(self) -> &'static str {
        match self {
            AC => "AC",
            AL => "AL",
            AP => "AP",
            AM => "AM",
            BA => "BA",
            CE => "CE",
            DF => "DF",
            ES => "ES",
            GO => "GO",
            MA => "MA",
            MT => "MT",
            MS => "MS",
            MG => "MG",
            PA => "PA",
            PB => "PB",
            PR => "PR",
            PE => "PE",
            PI => "PI",
            RJ => "RJ",
            RN => "RN",
            RS => "RS",
            RO => "RO",
            RR => "RR",
            SC => "SC",
            SP => "SP",
            SE => "SE",
            TO => "TO",
        }
    }

    pub const fn region(self) -> Region {
        match self {
            AC | AP | AM | PA | RO | RR | TO => Region::North,
            AL | BA | CE | MA | PB | PE | PI | RN | SE => Region::Northeast,
            DF | GO | MT | MS => Region::CenterWest,
            ES | MG | RJ | SP => Region::Southeast,
            PR | SC | RS => Region::South,
        }
    }

    /// Units sharing a land border.
    pub const fn neighbors(self) -> &'static [FederativeUnit] {
        match self {
            AC => &[AM, RO],
            AL => &[PE, SE, BA],
            AP => &[PA],
            AM => &[RR, PA, MT, RO, AC],
            BA => &[SE, AL, PE, PI, TO, GO, MG, ES],
            CE => &[RN, PB, PE, PI],
            DF => &[GO, MG],
            ES => &[BA, MG, RJ],
            GO => &[TO, BA, MG, MS, MT, DF],
            MA => &[PA, TO, PI],
            MT => &[RO, AM, PA, TO, GO, MS],
            MS => &[MT, GO, MG, SP, PR],
            MG => &[BA, ES, RJ, SP, MS, GO, DF],
            PA => &[AP, MA, TO, MT, AM, RR],
            PB => &[RN, CE, PE],
            PR => &[SP, MS, SC],
            PE => &[PB, CE, PI, BA, AL],
            PI => &[CE, MA, TO, BA, PE],
            RJ => &[ES, MG, SP],
            RN => &[PB, CE],
            RS => &[SC],
            RO => &[AC, AM, MT],
            RR => &[AM, PA],
            SC => &[PR, RS],
            SP => &[MG, RJ, PR, MS],
            SE => &[AL, BA],
            TO => &[MA, PI, BA, GO, MT, PA],
        }
    }

    pub fn borders(self, other: FederativeUnit) -> bool {
        self.neighbors().contains(&other)
    }
}
