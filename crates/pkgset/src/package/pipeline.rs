//! Read → filter → write pipeline over resource documents.

use tracing::{debug, info_span};

use super::document::ResourceDocument;
use super::error::Result;

/// Produces documents for a pipeline.
pub trait Reader {
    fn read(&self) -> Result<Vec<ResourceDocument>>;
}

/// Consumes the documents a pipeline produced.
pub trait Writer {
    fn write(&self, documents: &[ResourceDocument]) -> Result<()>;
}

/// Transforms the documents flowing through a pipeline.
pub trait Filter {
    fn filter(&mut self, documents: Vec<ResourceDocument>) -> Result<Vec<ResourceDocument>>;
}

impl<F> Filter for F
where
    F: FnMut(Vec<ResourceDocument>) -> Result<Vec<ResourceDocument>>,
{
    fn filter(&mut self, documents: Vec<ResourceDocument>) -> Result<Vec<ResourceDocument>> {
        self(documents)
    }
}

/// Reads from every input, applies the filters in order and hands the result
/// to every output. The first error aborts the run.
#[derive(Default)]
pub struct Pipeline<'a> {
    inputs: Vec<&'a dyn Reader>,
    filters: Vec<&'a mut dyn Filter>,
    outputs: Vec<&'a dyn Writer>,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, reader: &'a dyn Reader) -> Self {
        self.inputs.push(reader);
        self
    }

    pub fn filter(mut self, filter: &'a mut dyn Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn output(mut self, writer: &'a dyn Writer) -> Self {
        self.outputs.push(writer);
        self
    }

    /// Runs the pipeline.
    pub fn execute(self) -> Result<()> {
        let _pipeline_span = info_span!("pipeline",
            inputs = self.inputs.len(),
            filters = self.filters.len(),
            outputs = self.outputs.len(),
        )
        .entered();

        let mut documents = Vec::new();
        {
            let _step = info_span!("read").entered();
            for input in &self.inputs {
                documents.extend(input.read()?);
            }
            debug!(documents = documents.len(), "Read documents");
        }

        {
            let _step = info_span!("filter").entered();
            for filter in self.filters {
                documents = filter.filter(documents)?;
            }
        }

        {
            let _step = info_span!("write").entered();
            for output in &self.outputs {
                output.write(&documents)?;
            }
        }

        Ok(())
    }
}
