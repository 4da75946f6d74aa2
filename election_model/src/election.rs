//! The top level entity: one election held on one date.

use serde::{Deserialize, Serialize};

use crate::merge::{
    pick_longest, require_same, same_allow_empty, union_codes, MergeResult, Reconcile,
};
use crate::note::{normalise_notes, Note};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Election {
    pub code: String,
    pub title: String,

    pub location_country: String,
    pub location_administrative_area_name: String,
    pub location_locality_name: String,
    pub location_description: String,

    /// ISO date of polling day.
    pub date: String,
    pub date_time_zone: String,

    pub assembly_codes: Vec<String>,
    pub party_codes: Vec<String>,
    pub notes: Vec<Note>,
}

impl Reconcile for Election {
    fn key(&self) -> String {
        self.code.clone()
    }

    fn merge_in(&mut self, other: Election) -> MergeResult<()> {
        require_same("code", &self.code, &other.code)?;
        require_same("country", &self.location_country, &other.location_country)?;
        require_same(
            "administrative area",
            &self.location_administrative_area_name,
            &other.location_administrative_area_name,
        )?;
        self.location_locality_name = same_allow_empty(
            "locality",
            &self.location_locality_name,
            &other.location_locality_name,
        )?;
        self.location_description = same_allow_empty(
            "location description",
            &self.location_description,
            &other.location_description,
        )?;
        require_same("date", &self.date, &other.date)?;
        require_same("time zone", &self.date_time_zone, &other.date_time_zone)?;

        self.title = pick_longest(&self.title, &other.title);
        self.assembly_codes = union_codes(
            std::mem::take(&mut self.assembly_codes),
            other.assembly_codes,
        );
        self.party_codes = union_codes(std::mem::take(&mut self.party_codes), other.party_codes);
        self.notes = normalise_notes(std::mem::take(&mut self.notes), other.notes)?;
        Ok(())
    }
}
