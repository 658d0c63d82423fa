use crate::models::{Habit, HabitStore, TrackType, Tracker};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq)]
pub enum HabitError {
    #[error("habit {0} not found")]
    NotFound(Uuid),
    #[error("habit name must not be empty")]
    EmptyName,
    #[error("operation requires a {expected:?} habit")]
    WrongTrackType { expected: TrackType },
    #[error("invalid numeric value: {0:?}")]
    InvalidValue(String),
}

impl Habit {
    pub fn boolean(name: &str) -> Result<Self, HabitError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: clean_name(name)?,
            tracker: Tracker::Boolean {
                completions: BTreeSet::new(),
            },
        })
    }

    pub fn numeric(name: &str, unit: &str) -> Result<Self, HabitError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: clean_name(name)?,
            tracker: Tracker::Numeric {
                values: BTreeMap::new(),
                unit: unit.trim().to_string(),
            },
        })
    }

    pub fn track_type(&self) -> TrackType {
        match self.tracker {
            Tracker::Boolean { .. } => TrackType::Boolean,
            Tracker::Numeric { .. } => TrackType::Numeric,
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match &self.tracker {
            Tracker::Numeric { unit, .. } if !unit.is_empty() => Some(unit),
            _ => None,
        }
    }

    pub fn has_entry(&self, date: NaiveDate) -> bool {
        match &self.tracker {
            Tracker::Boolean { completions } => completions.contains(&date),
            Tracker::Numeric { values, .. } => values.contains_key(&date),
        }
    }

    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        match &self.tracker {
            Tracker::Boolean { completions } => {
                Some(if completions.contains(&date) { 1.0 } else { 0.0 })
            }
            Tracker::Numeric { values, .. } => values.get(&date).copied(),
        }
    }

    pub fn recorded_days(&self) -> Vec<NaiveDate> {
        match &self.tracker {
            Tracker::Boolean { completions } => completions.iter().copied().collect(),
            Tracker::Numeric { values, .. } => values.keys().copied().collect(),
        }
    }

    pub fn renamed(&self, name: &str) -> Result<Self, HabitError> {
        Ok(Self {
            name: clean_name(name)?,
            ..self.clone()
        })
    }

    pub fn with_unit(&self, unit: &str) -> Result<Self, HabitError> {
        match &self.tracker {
            Tracker::Numeric { values, .. } => Ok(Self {
                tracker: Tracker::Numeric {
                    values: values.clone(),
                    unit: unit.trim().to_string(),
                },
                ..self.clone()
            }),
            Tracker::Boolean { .. } => Err(HabitError::WrongTrackType {
                expected: TrackType::Numeric,
            }),
        }
    }

    pub fn toggled(&self, date: NaiveDate) -> Result<Self, HabitError> {
        match &self.tracker {
            Tracker::Boolean { completions } => {
                let mut completions = completions.clone();
                if !completions.remove(&date) {
                    completions.insert(date);
                }
                Ok(Self {
                    tracker: Tracker::Boolean { completions },
                    ..self.clone()
                })
            }
            Tracker::Numeric { .. } => Err(HabitError::WrongTrackType {
                expected: TrackType::Boolean,
            }),
        }
    }

    pub fn with_value(&self, date: NaiveDate, value: f64) -> Result<Self, HabitError> {
        if !value.is_finite() {
            return Err(HabitError::InvalidValue(value.to_string()));
        }
        self.map_values(|values| {
            values.insert(date, value);
        })
    }

    pub fn without_value(&self, date: NaiveDate) -> Result<Self, HabitError> {
        self.map_values(|values| {
            values.remove(&date);
        })
    }

    pub fn committed(&self, date: NaiveDate, raw: &str) -> Result<Self, HabitError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return self.map_values(|_| {});
        }
        let value = raw
            .parse::<f64>()
            .map_err(|_| HabitError::InvalidValue(raw.to_string()))?;
        self.with_value(date, value)
    }

    fn map_values(
        &self,
        edit: impl FnOnce(&mut BTreeMap<NaiveDate, f64>),
    ) -> Result<Self, HabitError> {
        match &self.tracker {
            Tracker::Numeric { values, unit } => {
                let mut values = values.clone();
                edit(&mut values);
                Ok(Self {
                    tracker: Tracker::Numeric {
                        values,
                        unit: unit.clone(),
                    },
                    ..self.clone()
                })
            }
            Tracker::Boolean { .. } => Err(HabitError::WrongTrackType {
                expected: TrackType::Numeric,
            }),
        }
    }
}

impl HabitStore {
    pub fn get(&self, id: Uuid) -> Result<&Habit, HabitError> {
        self.habits
            .iter()
            .find(|habit| habit.id == id)
            .ok_or(HabitError::NotFound(id))
    }

    pub fn with_habit(&self, habit: Habit) -> Self {
        let mut habits = self.habits.clone();
        habits.push(habit);
        Self { habits }
    }

    pub fn update(
        &self,
        id: Uuid,
        edit: impl FnOnce(&Habit) -> Result<Habit, HabitError>,
    ) -> Result<Self, HabitError> {
        let index = self
            .habits
            .iter()
            .position(|habit| habit.id == id)
            .ok_or(HabitError::NotFound(id))?;
        let updated = edit(&self.habits[index])?;
        let mut habits = self.habits.clone();
        habits[index] = updated;
        Ok(Self { habits })
    }

    pub fn without(&self, id: Uuid) -> Result<Self, HabitError> {
        self.get(id)?;
        Ok(Self {
            habits: self
                .habits
                .iter()
                .filter(|habit| habit.id != id)
                .cloned()
                .collect(),
        })
    }
}

fn clean_name(name: &str) -> Result<String, HabitError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(HabitError::EmptyName);
    }
    Ok(name.to_string())
}
