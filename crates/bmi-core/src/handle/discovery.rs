//! Capability discovery: component identity, declared variables and time semantics.

use crate::errors::BmiResult;
use crate::lifecycle::Operation;
use crate::session::Session;
use crate::time::TimeInfo;
use crate::variable::{ElementType, VariableCatalog, VariableDescriptor};

use super::ModelHandle;

impl<S: Session> ModelHandle<S> {
    pub fn component_name(&mut self) -> BmiResult<String> {
        self.lifecycle.check(Operation::Query)?;
        self.session.component_name()
    }

    pub fn input_variable_names(&mut self) -> BmiResult<Vec<String>> {
        self.lifecycle.check(Operation::Query)?;
        self.session.input_var_names()
    }

    pub fn output_variable_names(&mut self) -> BmiResult<Vec<String>> {
        self.lifecycle.check(Operation::Query)?;
        self.session.output_var_names()
    }

    pub fn time_unit(&mut self) -> BmiResult<String> {
        self.lifecycle.check(Operation::Query)?;
        self.session.time_units()
    }

    pub fn start_time(&mut self) -> BmiResult<f64> {
        self.lifecycle.check(Operation::Query)?;
        self.session.start_time()
    }

    pub fn end_time(&mut self) -> BmiResult<f64> {
        self.lifecycle.check(Operation::Query)?;
        self.session.end_time()
    }

    pub fn current_time(&mut self) -> BmiResult<f64> {
        self.lifecycle.check(Operation::Query)?;
        self.session.current_time()
    }

    pub fn time_step(&mut self) -> BmiResult<f64> {
        self.lifecycle.check(Operation::Query)?;
        self.session.time_step()
    }

    /// All time metadata in a single snapshot.
    pub fn time_info(&mut self) -> BmiResult<TimeInfo> {
        self.lifecycle.check(Operation::Query)?;
        Ok(TimeInfo {
            start: self.session.start_time()?,
            end: self.session.end_time()?,
            current: self.session.current_time()?,
            step: self.session.time_step()?,
            units: self.session.time_units()?,
        })
    }

    pub fn var_type(&mut self, name: &str) -> BmiResult<ElementType> {
        self.lifecycle.check(Operation::Query)?;
        self.catalog.require(name)?;
        self.session.var_type(name)
    }

    pub fn var_units(&mut self, name: &str) -> BmiResult<String> {
        self.lifecycle.check(Operation::Query)?;
        self.catalog.require(name)?;
        self.session.var_units(name)
    }

    /// Everything discovery reports about the variable `name`.
    pub fn describe_variable(&mut self, name: &str) -> BmiResult<VariableDescriptor> {
        self.lifecycle.check(Operation::Query)?;
        let role = self.catalog.require(name)?;
        Ok(VariableDescriptor {
            name: name.to_string(),
            role,
            grid: self.session.var_grid(name)?,
            element_type: self.session.var_type(name)?,
            units: self.session.var_units(name)?,
        })
    }

    /// Re-queries the declared variable names.
    ///
    /// Only needed for models whose declared variables can change after initialization.
    pub fn refresh_catalog(&mut self) -> BmiResult<&VariableCatalog> {
        self.lifecycle.check(Operation::Query)?;
        self.catalog = self.query_catalog()?;
        Ok(&self.catalog)
    }

    pub(super) fn query_catalog(&mut self) -> BmiResult<VariableCatalog> {
        Ok(VariableCatalog::new(
            self.session.input_var_names()?,
            self.session.output_var_names()?,
        ))
    }
}
