//! [`Query`] collection related to service level agreements.

use std::convert::Infallible;

use crate::{
    domain::slm::{AnswersSet, Strategy},
    Service,
};

use super::Query;

/// Computes a service level agreement date with the provided [`Strategy`].
#[derive(Clone, Debug)]
pub struct Compute {
    /// [`Strategy`] to compute the date with.
    pub strategy: Strategy,

    /// [`AnswersSet`] of the submitted form.
    pub answers: AnswersSet,
}

impl<Dir: Sync> Query<Compute> for Service<Dir> {
    type Ok = Option<String>;
    type Err = Infallible;

    async fn execute(&self, query: Compute) -> Result<Self::Ok, Self::Err> {
        let Compute { strategy, answers } = query;

        let date = strategy.compute(&answers);
        if date.is_none() {
            tracing::debug!(
                strategy = strategy.key(),
                "service level agreement date is not computed",
            );
        }
        Ok(date)
    }
}
