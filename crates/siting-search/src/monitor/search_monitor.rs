// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use siting_model::{model::Model, solution::Solution};

/// What a monitor asks the engine to do next.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum SearchCommand {
    #[default]
    Continue,
    Terminate(String),
}

impl std::fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchCommand::Continue => write!(f, "Continue"),
            SearchCommand::Terminate(reason) => write!(f, "Terminate: {}", reason),
        }
    }
}

/// Lifecycle hooks invoked by a search engine.
///
/// `on_step` is called once per node pop; `search_command` right after it.
pub trait SearchMonitor {
    fn name(&self) -> &str;
    fn on_enter_search(&mut self, model: &Model);
    fn on_exit_search(&mut self);
    fn on_solution_found(&mut self, solution: &Solution);
    fn on_step(&mut self);
    fn search_command(&self) -> SearchCommand;
}

impl<M> SearchMonitor for &mut M
where
    M: SearchMonitor + ?Sized,
{
    #[inline(always)]
    fn name(&self) -> &str {
        (**self).name()
    }

    #[inline(always)]
    fn on_enter_search(&mut self, model: &Model) {
        (**self).on_enter_search(model);
    }

    #[inline(always)]
    fn on_exit_search(&mut self) {
        (**self).on_exit_search();
    }

    #[inline(always)]
    fn on_solution_found(&mut self, solution: &Solution) {
        (**self).on_solution_found(solution);
    }

    #[inline(always)]
    fn on_step(&mut self) {
        (**self).on_step();
    }

    #[inline(always)]
    fn search_command(&self) -> SearchCommand {
        (**self).search_command()
    }
}

impl<M> SearchMonitor for Box<M>
where
    M: SearchMonitor + ?Sized,
{
    #[inline(always)]
    fn name(&self) -> &str {
        (**self).name()
    }

    #[inline(always)]
    fn on_enter_search(&mut self, model: &Model) {
        (**self).on_enter_search(model);
    }

    #[inline(always)]
    fn on_exit_search(&mut self) {
        (**self).on_exit_search();
    }

    #[inline(always)]
    fn on_solution_found(&mut self, solution: &Solution) {
        (**self).on_solution_found(solution);
    }

    #[inline(always)]
    fn on_step(&mut self) {
        (**self).on_step();
    }

    #[inline(always)]
    fn search_command(&self) -> SearchCommand {
        (**self).search_command()
    }
}

impl std::fmt::Debug for dyn SearchMonitor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}

impl std::fmt::Display for dyn SearchMonitor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}
