use super::Val;
use crate::error;
use crate::lang::Error;
use std::collections::HashMap;

type Result<T> = std::result::Result<T, Error>;

/// ## Variable memory
///
/// Five maps keyed by uppercased name: numeric and string scalars, numeric
/// and string arrays, and per-axis dimensions. Reads of absent scalars
/// yield zero or the empty string; the first element access of an
/// undimensioned array allocates one axis of size 11 (indexes 0..10).

#[derive(Debug, Default)]
pub struct Var {
    numbers: HashMap<String, f64>,
    strings: HashMap<String, String>,
    number_arrays: HashMap<String, Vec<f64>>,
    string_arrays: HashMap<String, Vec<String>>,
    dims: HashMap<String, Vec<usize>>,
}

impl Var {
    pub fn new() -> Var {
        Var::default()
    }

    pub fn clear(&mut self) {
        self.numbers.clear();
        self.strings.clear();
        self.number_arrays.clear();
        self.string_arrays.clear();
        self.dims.clear();
    }

    pub fn is_string(name: &str) -> bool {
        name.ends_with('$')
    }

    pub fn get_num(&self, name: &str) -> f64 {
        let name = normalize(name);
        self.numbers.get(&name).copied().unwrap_or(0.0)
    }

    pub fn set_num(&mut self, name: &str, value: f64) -> Result<()> {
        let name = normalize(name);
        check_name(&name)?;
        self.numbers.insert(name, value);
        Ok(())
    }

    pub fn get_str(&self, name: &str) -> String {
        let name = normalize(name);
        self.strings.get(&name).cloned().unwrap_or_default()
    }

    pub fn set_str(&mut self, name: &str, value: String) -> Result<()> {
        let name = normalize(name);
        check_name(&name)?;
        self.strings.insert(name, value);
        Ok(())
    }

    /// Allocate an array. Index 0 is legal, so each axis holds `size + 1`
    /// slots. Dimensioning an existing name re-allocates it.
    pub fn dim(&mut self, name: &str, sizes: &[i64]) -> Result<()> {
        let name = normalize(name);
        check_name(&name)?;
        let mut axes = Vec::with_capacity(sizes.len());
        for &size in sizes {
            if size < 0 {
                return Err(error!(IllegalFunctionCall));
            }
            axes.push(size as usize + 1);
        }
        let total = axes.iter().product();
        if Var::is_string(&name) {
            self.string_arrays.insert(name.clone(), vec![String::new(); total]);
        } else {
            self.number_arrays.insert(name.clone(), vec![0.0; total]);
        }
        self.dims.insert(name, axes);
        Ok(())
    }

    pub fn fetch_elem(&mut self, name: &str, indexes: &[i64]) -> Result<Val> {
        let name = normalize(name);
        let at = self.offset(&name, indexes)?;
        if Var::is_string(&name) {
            Ok(Val::String(self.string_arrays[&name][at].clone()))
        } else {
            Ok(Val::Number(self.number_arrays[&name][at]))
        }
    }

    pub fn store_elem(&mut self, name: &str, indexes: &[i64], value: Val) -> Result<()> {
        let name = normalize(name);
        let at = self.offset(&name, indexes)?;
        if Var::is_string(&name) {
            self.string_arrays.get_mut(&name).unwrap()[at] = value.string()?;
        } else {
            self.number_arrays.get_mut(&name).unwrap()[at] = value.number()?;
        }
        Ok(())
    }

    /// Row-major linear index, auto-dimensioning on first access.
    fn offset(&mut self, name: &str, indexes: &[i64]) -> Result<usize> {
        if !self.dims.contains_key(name) {
            self.dim(name, &[10])?;
        }
        let axes = &self.dims[name];
        if axes.len() != indexes.len() {
            return Err(error!(SubscriptOutOfRange));
        }
        let mut linear = 0;
        for (&index, &axis) in indexes.iter().zip(axes) {
            if index < 0 || index as usize >= axis {
                return Err(error!(SubscriptOutOfRange));
            }
            linear = linear * axis + index as usize;
        }
        Ok(linear)
    }
}

fn normalize(name: &str) -> String {
    name.to_ascii_uppercase()
}

/// Legal names: a letter, or a letter and a digit, optionally suffixed `$`.
fn check_name(name: &str) -> Result<()> {
    let base = name.strip_suffix('$').unwrap_or(name);
    let mut chars = base.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err(error!(IllegalVariableName)),
    }
    match chars.next() {
        None => Ok(()),
        Some(c) if c.is_ascii_digit() && chars.next().is_none() => Ok(()),
        _ => Err(error!(IllegalVariableName)),
    }
}
