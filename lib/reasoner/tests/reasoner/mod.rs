mod fixpoint;
mod ontology;
