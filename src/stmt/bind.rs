//! Binding of parameter placeholders

use super::Position;
use super::vars::Variable;
use crate::{Result, Error, err::codes, types::Value};

/// Represents statement parameters (a.k.a. parameter placeholders).
///
/// IN values persist between executions, so a statement can be re-executed
/// while rebinding only the arguments that changed. OUT state is reset by
/// every execution call.
pub struct Params {
    /// Placeholder names, uppercase, in order of first appearance
    names: Vec<String>,
    /// Indexes of the parameters named in RETURNING ... INTO
    out_params: Vec<usize>,
    /// IN values
    values: Vec<Option<Value>>,
    /// Parameters bound for output
    is_out: Vec<bool>,
    /// Output variables attached to parameters
    vars: Vec<Option<Variable>>,
    /// Captured RETURNING values: per parameter, one batch per iteration
    out_batches: Vec<Vec<Vec<Value>>>,
    /// NULL indicators
    nulls: Vec<bool>,
}

impl Params {
    pub(crate) fn new(names: Vec<String>, out_params: Vec<usize>) -> Self {
        let num_params = names.len();
        Self {
            names,
            out_params,
            values: vec![None; num_params],
            is_out: vec![false; num_params],
            vars: vec![None; num_params],
            out_batches: vec![Vec::new(); num_params],
            nulls: vec![true; num_params],
        }
    }

    /// Returns the bind name without an optional leading colon
    fn strip_colon(name: &str) -> &str {
        if let Some(stripped) = name.strip_prefix(':') {
            stripped
        } else {
            name
        }
    }

    /// Returns index of the parameter placeholder.
    pub(crate) fn index_of(&self, name: &str) -> Result<usize> {
        // Assume `name` is already uppercase and use it as-is first.
        // Explicitly convert to uppercase only if as-is search fails.
        let name = Self::strip_colon(name);
        if let Some(ix) = self.names.iter().position(|n| n == name) {
            Ok(ix)
        } else {
            let name = name.to_uppercase();
            self.names.iter().position(|n| *n == name)
                .ok_or_else(|| Error::msg(format!("Statement does not define parameter placeholder {}", name)))
        }
    }

    fn check_index(&self, ix: usize) -> Result<()> {
        if ix < self.names.len() {
            Ok(())
        } else {
            Err( Error::msg(format!("Statement does not define parameter placeholder :{}", ix + 1)) )
        }
    }

    /// Binds an IN argument to the parameter at the specified position.
    pub(crate) fn bind_in(&mut self, ix: usize, val: Value) -> Result<()> {
        self.check_index(ix)?;
        self.nulls[ix] = val.is_null();
        self.values[ix] = Some(val);
        self.is_out[ix] = false;
        self.vars[ix] = None;
        Ok(())
    }

    /// Marks the parameter at the specified position as a scalar output bind.
    pub(crate) fn bind_out(&mut self, ix: usize) -> Result<()> {
        self.check_index(ix)?;
        self.is_out[ix] = true;
        self.vars[ix] = None;
        self.nulls[ix] = true;
        Ok(())
    }

    /// Attaches an output variable to the parameter at the specified position.
    pub(crate) fn bind_var(&mut self, ix: usize, var: &Variable) -> Result<()> {
        self.check_index(ix)?;
        self.is_out[ix] = true;
        self.vars[ix] = Some(var.clone());
        self.nulls[ix] = true;
        Ok(())
    }

    /// The current IN value of a parameter.
    pub(crate) fn in_value(&self, ix: usize) -> Result<Value> {
        match self.values.get(ix) {
            Some(Some(val)) => Ok(val.clone()),
            _ => Err( Error::db(codes::NOT_ALL_VARIABLES_BOUND, "not all variables bound") ),
        }
    }

    /// Every parameter of the RETURNING INTO list must have an output bind.
    pub(crate) fn check_out_binds(&self) -> Result<()> {
        for &ix in &self.out_params {
            if !self.is_out[ix] {
                return Err( Error::msg(format!(
                    "RETURNING INTO parameter :{} requires an output bind", self.names[ix]
                )));
            }
        }
        Ok(())
    }

    /// The name of the first output parameter that is not backed by a
    /// `Variable`, if any.
    pub(crate) fn scalar_out_name(&self) -> Option<&str> {
        self.out_params.iter()
            .find(|&&ix| self.is_out[ix] && self.vars[ix].is_none())
            .map(|&ix| self.names[ix].as_str())
    }

    /// Attached output variables with the names of their parameters.
    pub(crate) fn bound_vars(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.names.iter().zip(self.vars.iter())
            .filter_map(|(name, var)| var.as_ref().map(|var| (name.as_str(), var)))
    }

    /// Discards the output state of the previous execution.
    pub(crate) fn reset_out(&mut self) {
        for &ix in &self.out_params {
            self.out_batches[ix].clear();
            self.nulls[ix] = true;
        }
    }

    /// Opens a new capture batch for each output parameter. Called once
    /// per execution iteration.
    pub(crate) fn begin_iteration(&mut self) {
        for &ix in &self.out_params {
            self.out_batches[ix].push(Vec::new());
        }
    }

    /// Records a value produced by the RETURNING clause of the current
    /// iteration for the parameter at the specified position.
    pub(crate) fn capture(&mut self, ix: usize, val: Value) -> Result<()> {
        let val = match &self.vars[ix] {
            Some(var) => var.check_capture(val)?,
            None => {
                let batch = self.out_batches[ix].last().map(|batch| batch.len()).unwrap_or(0);
                if batch > 0 {
                    return Err( Error::msg(format!(
                        "RETURNING produced more than one row for the scalar output bind :{}; bind an output Variable instead",
                        self.names[ix]
                    )));
                }
                val
            }
        };
        if let Some(batch) = self.out_batches[ix].last_mut() {
            batch.push(val);
        }
        Ok(())
    }

    /// Settles NULL indicators and publishes the captured batches into
    /// the attached output variables.
    pub(crate) fn finish_execution(&mut self) {
        for &ix in &self.out_params {
            let all_null = !self.out_batches[ix].iter().any(|batch| batch.iter().any(|val| !val.is_null()));
            self.nulls[ix] = all_null;
            if let Some(var) = &self.vars[ix] {
                var.replace(self.out_batches[ix].clone());
            }
        }
    }

    /// The value captured for a scalar output bind: the first row of the
    /// last non-empty batch.
    pub(crate) fn out_scalar(&self, ix: usize) -> Option<&Value> {
        self.out_batches.get(ix)
            .and_then(|batches| batches.iter().rev().find(|batch| !batch.is_empty()))
            .and_then(|batch| batch.first())
    }

    /// Checks whether the value of the parameter is NULL.
    pub(crate) fn is_null(&self, pos: impl Position) -> Result<bool> {
        pos.name()
            .and_then(|name| self.index_of(name).ok())
            .or_else(|| pos.index())
            .map(|ix| self.nulls.get(ix).copied().unwrap_or(true))
            .ok_or_else(|| Error::new("Parameter not found."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Params {
        Params::new(vec!["ID".into(), "NAME".into(), "OUT_ID".into()], vec![2])
    }

    #[test]
    fn index_of_strips_colon_and_folds_case() -> Result<()> {
        let params = params();
        assert_eq!(params.index_of(":ID")?, 0);
        assert_eq!(params.index_of("name")?, 1);
        assert_eq!(params.index_of(":out_id")?, 2);
        assert!(params.index_of("missing").is_err());
        Ok(())
    }

    #[test]
    fn unbound_parameter_is_reported() {
        let mut params = params();
        params.bind_in(0, Value::text("x")).unwrap();
        let err = params.in_value(1).unwrap_err();
        assert_eq!(err.code(), Some(1008));
    }

    #[test]
    fn returning_into_requires_output_bind() {
        let mut params = params();
        params.bind_in(2, Value::text("x")).unwrap();
        assert!(params.check_out_binds().is_err());
        params.bind_out(2).unwrap();
        assert!(params.check_out_binds().is_ok());
    }

    #[test]
    fn second_row_overflows_scalar_bind() {
        let mut params = params();
        params.bind_out(2).unwrap();
        params.reset_out();
        params.begin_iteration();
        params.capture(2, Value::text("one")).unwrap();
        assert!(params.capture(2, Value::text("two")).is_err());
    }
}
