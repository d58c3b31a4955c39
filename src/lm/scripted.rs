use super::TextGenerator;
use anyhow::Result;
use std::cell::RefCell;

type Responder = Box<dyn Fn(&str) -> Result<String>>;

/// In-memory generator that answers from a closure and records every prompt.
pub(crate) struct ScriptedGenerator {
    respond: Responder,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedGenerator {
    pub(crate) fn new(respond: impl Fn(&str) -> Result<String> + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn constant(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        (self.respond)(prompt)
    }

    fn label(&self) -> &str {
        "scripted"
    }
}
