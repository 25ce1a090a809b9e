//! Establishment record
//!
//! The registry table has a fixed, flat schema. Every column is declared once
//! in the `establishment_schema!` invocation below; the struct, the column
//! order and the by-name accessors are all generated from that list so they
//! cannot drift apart.

use serde::{Deserialize, Serialize};

/// Key columns, always first in storage order.
pub const SIREN: &str = "siren";
pub const NIC: &str = "nic";
pub const SIRET: &str = "siret";

/// Primary trade name, the optional create-time completeness field.
pub const TRADE_NAME: &str = "enseigne1etablissement";

macro_rules! establishment_schema {
    ($($field:ident),+ $(,)?) => {
        /// One row of the establishment registry.
        ///
        /// Field names are the lower-cased column identifiers of the persisted
        /// table, which is also the JSON shape served to clients.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct Establishment {
            pub siren: Option<String>,
            pub nic: Option<String>,
            pub siret: String,
            $(pub $field: Option<String>,)+
        }

        /// Storage column order.
        pub const COLUMNS: &[&str] = &[SIREN, NIC, SIRET, $(stringify!($field)),+];

        impl Establishment {
            /// Value of a column by its lower-case name. `None` for a null
            /// value or an unknown column.
            pub fn field(&self, column: &str) -> Option<&str> {
                match column {
                    SIREN => self.siren.as_deref(),
                    NIC => self.nic.as_deref(),
                    SIRET => Some(self.siret.as_str()),
                    $(stringify!($field) => self.$field.as_deref(),)+
                    _ => None,
                }
            }

            /// Slot of a nullable column. The key column `siret` is not
            /// nullable and has no slot.
            pub fn slot_mut(&mut self, column: &str) -> Option<&mut Option<String>> {
                match column {
                    SIREN => Some(&mut self.siren),
                    NIC => Some(&mut self.nic),
                    $(stringify!($field) => Some(&mut self.$field),)+
                    _ => None,
                }
            }
        }
    };
}

establishment_schema! {
    statutdiffusionetablissement,
    datecreationetablissement,
    trancheeffectifsetablissement,
    anneeeffectifsetablissement,
    activiteprincipaleregistremetiersetablissement,
    datederniertraitementetablissement,
    etablissementsiege,
    nombreperiodesetablissement,
    complementadresseetablissement,
    numerovoieetablissement,
    indicerepetitionetablissement,
    typevoieetablissement,
    libellevoieetablissement,
    codepostaletablissement,
    libellecommuneetablissement,
    libellecommuneetrangeretablissement,
    distributionspecialeetablissement,
    codecommuneetablissement,
    codecedexetablissement,
    libellecedexetablissement,
    codepaysetrangeretablissement,
    libellepaysetrangeretablissement,
    complementadresse2etablissement,
    numerovoie2etablissement,
    indicerepetition2etablissement,
    typevoie2etablissement,
    libellevoie2etablissement,
    codepostal2etablissement,
    libellecommune2etablissement,
    libellecommuneetranger2etablissement,
    distributionspeciale2etablissement,
    codecommune2etablissement,
    codecedex2etablissement,
    libellecedex2etablissement,
    codepaysetranger2etablissement,
    libellepaysetranger2etablissement,
    datedebut,
    etatadministratifetablissement,
    enseigne1etablissement,
    enseigne2etablissement,
    enseigne3etablissement,
    denominationusuelleetablissement,
    activiteprincipaleetablissement,
    nomenclatureactiviteprincipaleetablissement,
    caractereemployeuretablissement,
}

/// Case-insensitive lookup of a column name, returning the canonical
/// (lower-case, `'static`) identifier.
pub fn canonical_column(name: &str) -> Option<&'static str> {
    let lowered = name.trim().to_ascii_lowercase();
    COLUMNS.iter().copied().find(|column| *column == lowered)
}

/// Whether the column is part of the composite key (`siren`, `nic`, `siret`).
pub fn is_key_column(column: &str) -> bool {
    matches!(column, SIREN | NIC | SIRET)
}

impl Establishment {
    pub fn new(siret: impl Into<String>) -> Self {
        Self {
            siret: siret.into(),
            ..Self::default()
        }
    }
}
