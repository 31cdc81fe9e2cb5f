//! Choice tracking across the island scenes.
//!
//! Every choice the guest makes is drawn from a closed set: items and
//! people come from the session [`Catalog`], plans are a fixed enum.
//! Display strings only appear when the story is rendered.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Items that must be packed for the island.
pub const REQUIRED_ITEMS: usize = 3;

/// People that can be saved when escaping.
pub const REQUIRED_ESCAPEES: usize = 2;

/// Errors from recording choices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChoiceError {
    #[error("exactly {required} must be selected (currently {selected})")]
    GateClosed { selected: usize, required: usize },

    #[error("{0} has not been chosen yet")]
    Missing(&'static str),

    #[error("escapees can only be chosen after deciding to escape")]
    NotEscaping,

    #[error("unknown item: {0}")]
    UnknownItem(String),

    #[error("unknown person: {0}")]
    UnknownPerson(String),

    #[error("unknown plan: {0}")]
    UnknownPlan(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

/// An item from the session catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(usize);

/// A person from the session catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(usize);

impl ItemId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl PersonId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The items and people offered during a session, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<String>,
    people: Vec<String>,
}

impl Catalog {
    /// Build a catalog, rejecting sets too small to finish the flow.
    pub fn new(
        items: impl IntoIterator<Item = impl Into<String>>,
        people: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, ChoiceError> {
        let catalog = Self {
            items: items.into_iter().map(Into::into).collect(),
            people: people.into_iter().map(Into::into).collect(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check the catalog can satisfy every gate.
    ///
    /// One person is chosen and two more are saved, so at least three
    /// people are needed. Names must be unique so lookups are unambiguous.
    pub fn validate(&self) -> Result<(), ChoiceError> {
        if self.items.len() < REQUIRED_ITEMS {
            return Err(ChoiceError::InvalidCatalog(format!(
                "need at least {REQUIRED_ITEMS} items, got {}",
                self.items.len()
            )));
        }
        if self.people.len() < REQUIRED_ESCAPEES + 1 {
            return Err(ChoiceError::InvalidCatalog(format!(
                "need at least {} people, got {}",
                REQUIRED_ESCAPEES + 1,
                self.people.len()
            )));
        }
        for (kind, names) in [("item", &self.items), ("person", &self.people)] {
            for (i, name) in names.iter().enumerate() {
                if name.trim().is_empty() {
                    return Err(ChoiceError::InvalidCatalog(format!("empty {kind} name")));
                }
                if names[..i].contains(name) {
                    return Err(ChoiceError::InvalidCatalog(format!(
                        "duplicate {kind}: {name}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn items(&self) -> impl Iterator<Item = (ItemId, &str)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, name)| (ItemId(i), name.as_str()))
    }

    pub fn people(&self) -> impl Iterator<Item = (PersonId, &str)> {
        self.people
            .iter()
            .enumerate()
            .map(|(i, name)| (PersonId(i), name.as_str()))
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        (0..self.items.len()).map(ItemId).collect()
    }

    pub fn person_ids(&self) -> Vec<PersonId> {
        (0..self.people.len()).map(PersonId).collect()
    }

    pub fn item_name(&self, id: ItemId) -> &str {
        self.items.get(id.0).map(String::as_str).unwrap_or_default()
    }

    pub fn person_name(&self, id: PersonId) -> &str {
        self.people.get(id.0).map(String::as_str).unwrap_or_default()
    }

    /// Look up an item by its display name.
    pub fn find_item(&self, name: &str) -> Result<ItemId, ChoiceError> {
        self.items
            .iter()
            .position(|n| n == name)
            .map(ItemId)
            .ok_or_else(|| ChoiceError::UnknownItem(name.to_string()))
    }

    /// Look up a person by their display name.
    pub fn find_person(&self, name: &str) -> Result<PersonId, ChoiceError> {
        self.people
            .iter()
            .position(|n| n == name)
            .map(PersonId)
            .ok_or_else(|| ChoiceError::UnknownPerson(name.to_string()))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            items: [
                "Telefon",
                "Powerbank",
                "Güneş kremi",
                "Kitap",
                "Hamak",
                "Kulaklık",
                "Çakı",
                "Türk kahvesi",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            people: ["Elif", "Mert", "Ece", "Kaan", "Defne"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// The answer to the escape dilemma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dilemma {
    Escaped,
    Stayed,
}

impl Dilemma {
    pub fn label(&self) -> &'static str {
        match self {
            Dilemma::Escaped => "kaçtı",
            Dilemma::Stayed => "kaçmadı",
        }
    }
}

/// What to do once the island question is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    HangOut,
    FindActivity,
    DoWeHaveTo,
    Sunbathe,
    PostStory,
}

impl Plan {
    pub fn all() -> &'static [Plan] {
        &[
            Plan::HangOut,
            Plan::FindActivity,
            Plan::DoWeHaveTo,
            Plan::Sunbathe,
            Plan::PostStory,
        ]
    }

    /// Button label, also quoted in the story.
    pub fn label(&self) -> &'static str {
        match self {
            Plan::HangOut => "Hiiç takılırız",
            Plan::FindActivity => "Aktivite ararız",
            Plan::DoWeHaveTo => "İlla bir şey mi yapmamız gerek",
            Plan::Sunbathe => "Güneşlenmem lazım",
            Plan::PostStory => "Story atıcam 1 saniye",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Plan {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Plan::all()
            .iter()
            .copied()
            .find(|plan| plan.label() == s)
            .ok_or_else(|| ChoiceError::UnknownPlan(s.to_string()))
    }
}

/// A "select exactly N" gate on a continue button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    pub selected: usize,
    pub required: usize,
}

impl Gate {
    pub fn is_open(&self) -> bool {
        self.selected == self.required
    }

    /// The "pick exactly N" warning is shown whenever the gate is closed.
    pub fn shows_warning(&self) -> bool {
        !self.is_open()
    }

    fn check(&self) -> Result<(), ChoiceError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(ChoiceError::GateClosed {
                selected: self.selected,
                required: self.required,
            })
        }
    }
}

/// A checklist over a fixed set of options.
///
/// The count is never capped; checking one too many just closes the gate.
#[derive(Debug, Clone)]
pub struct Selection<T> {
    options: Vec<T>,
    checked: Vec<bool>,
    required: usize,
}

impl<T: Copy + PartialEq> Selection<T> {
    pub fn new(options: Vec<T>, required: usize) -> Self {
        let checked = vec![false; options.len()];
        Self {
            options,
            checked,
            required,
        }
    }

    /// Flip `value`. Values outside the option list are ignored.
    pub fn toggle(&mut self, value: T) -> Gate {
        if let Some(i) = self.options.iter().position(|o| *o == value) {
            self.checked[i] = !self.checked[i];
        }
        self.gate()
    }

    pub fn is_checked(&self, value: T) -> bool {
        self.options
            .iter()
            .position(|o| *o == value)
            .map(|i| self.checked[i])
            .unwrap_or(false)
    }

    /// Checked values in option order.
    pub fn checked(&self) -> Vec<T> {
        self.options
            .iter()
            .zip(&self.checked)
            .filter(|(_, checked)| **checked)
            .map(|(option, _)| *option)
            .collect()
    }

    pub fn options(&self) -> &[T] {
        &self.options
    }

    pub fn gate(&self) -> Gate {
        Gate {
            selected: self.checked.iter().filter(|c| **c).count(),
            required: self.required,
        }
    }
}

/// Everything chosen so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRecord {
    pub items: Vec<ItemId>,
    pub person: Option<PersonId>,
    pub dilemma: Option<Dilemma>,
    pub escapees: Vec<PersonId>,
    pub plan: Option<Plan>,
}

/// How the dilemma played out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Stayed,
    Escaped([PersonId; REQUIRED_ESCAPEES]),
}

impl Outcome {
    pub fn dilemma(&self) -> Dilemma {
        match self {
            Outcome::Stayed => Dilemma::Stayed,
            Outcome::Escaped(_) => Dilemma::Escaped,
        }
    }
}

/// A complete record, ready to be told as a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalChoices {
    pub items: [ItemId; REQUIRED_ITEMS],
    pub person: PersonId,
    pub outcome: Outcome,
    pub plan: Plan,
}

impl ChoiceRecord {
    /// Check every field is populated and convert to [`FinalChoices`].
    pub fn finalize(&self) -> Result<FinalChoices, ChoiceError> {
        let items: [ItemId; REQUIRED_ITEMS] =
            self.items
                .clone()
                .try_into()
                .map_err(|items: Vec<ItemId>| ChoiceError::GateClosed {
                    selected: items.len(),
                    required: REQUIRED_ITEMS,
                })?;
        let person = self.person.ok_or(ChoiceError::Missing("person"))?;
        let outcome = match self.dilemma.ok_or(ChoiceError::Missing("dilemma"))? {
            Dilemma::Stayed => Outcome::Stayed,
            Dilemma::Escaped => Outcome::Escaped(self.escapees.clone().try_into().map_err(
                |escapees: Vec<PersonId>| ChoiceError::GateClosed {
                    selected: escapees.len(),
                    required: REQUIRED_ESCAPEES,
                },
            )?),
        };
        let plan = self.plan.ok_or(ChoiceError::Missing("plan"))?;

        Ok(FinalChoices {
            items,
            person,
            outcome,
            plan,
        })
    }
}

/// Records choices at each checkpoint and gates the continue buttons.
#[derive(Debug, Clone)]
pub struct ChoiceAccumulator {
    catalog: Catalog,
    items: Selection<ItemId>,
    person: Option<PersonId>,
    escapees: Option<Selection<PersonId>>,
    record: ChoiceRecord,
}

impl ChoiceAccumulator {
    pub fn new(catalog: Catalog) -> Self {
        let items = Selection::new(catalog.item_ids(), REQUIRED_ITEMS);
        Self {
            catalog,
            items,
            person: None,
            escapees: None,
            record: ChoiceRecord::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn record(&self) -> &ChoiceRecord {
        &self.record
    }

    // =========================================================================
    // Items
    // =========================================================================

    pub fn item_selection(&self) -> &Selection<ItemId> {
        &self.items
    }

    pub fn toggle_item(&mut self, item: ItemId) -> Gate {
        self.items.toggle(item)
    }

    pub fn items_gate(&self) -> Gate {
        self.items.gate()
    }

    pub fn confirm_items(&mut self) -> Result<&[ItemId], ChoiceError> {
        self.items.gate().check()?;
        self.record.items = self.items.checked();
        Ok(&self.record.items)
    }

    // =========================================================================
    // Person
    // =========================================================================

    pub fn selected_person(&self) -> Option<PersonId> {
        self.person
    }

    pub fn select_person(&mut self, person: PersonId) -> Gate {
        self.person = Some(person);
        self.person_gate()
    }

    pub fn person_gate(&self) -> Gate {
        Gate {
            selected: usize::from(self.person.is_some()),
            required: 1,
        }
    }

    pub fn confirm_person(&mut self) -> Result<PersonId, ChoiceError> {
        let person = self.person.ok_or(ChoiceError::Missing("person"))?;
        self.record.person = Some(person);
        Ok(person)
    }

    // =========================================================================
    // Dilemma and escapees
    // =========================================================================

    /// Record the dilemma answer.
    ///
    /// Escaping opens the escapee checklist with everyone except the
    /// person already on the island.
    pub fn choose_dilemma(&mut self, dilemma: Dilemma) -> Result<(), ChoiceError> {
        let person = self.record.person.ok_or(ChoiceError::Missing("person"))?;
        self.record.dilemma = Some(dilemma);
        match dilemma {
            Dilemma::Escaped => {
                let others = self
                    .catalog
                    .person_ids()
                    .into_iter()
                    .filter(|p| *p != person)
                    .collect();
                self.escapees = Some(Selection::new(others, REQUIRED_ESCAPEES));
            }
            Dilemma::Stayed => {
                self.escapees = None;
                self.record.escapees.clear();
            }
        }
        Ok(())
    }

    pub fn escapee_selection(&self) -> Option<&Selection<PersonId>> {
        self.escapees.as_ref()
    }

    pub fn toggle_escapee(&mut self, person: PersonId) -> Result<Gate, ChoiceError> {
        let selection = self.escapees.as_mut().ok_or(ChoiceError::NotEscaping)?;
        Ok(selection.toggle(person))
    }

    pub fn escapees_gate(&self) -> Option<Gate> {
        self.escapees.as_ref().map(Selection::gate)
    }

    pub fn confirm_escapees(&mut self) -> Result<[PersonId; REQUIRED_ESCAPEES], ChoiceError> {
        let selection = self.escapees.as_ref().ok_or(ChoiceError::NotEscaping)?;
        selection.gate().check()?;
        let checked = selection.checked();
        let pair = [checked[0], checked[1]];
        self.record.escapees = checked;
        Ok(pair)
    }

    // =========================================================================
    // Plan
    // =========================================================================

    /// Record the plan and finalize the record.
    pub fn choose_plan(&mut self, plan: Plan) -> Result<FinalChoices, ChoiceError> {
        self.record.plan = Some(plan);
        self.record.finalize()
    }
}
