//! Prompt templates for the judge-based graders
//!
//! Each template asks for a JSON-only reply so the verdict parser has a
//! fighting chance even with chatty judges. Placeholders use the
//! `__NAME__` convention and are substituted with [`render`].

pub(crate) const REASONING_PROMPT: &str = "\
You are an expert evaluator of AI reasoning chains.
Verify whether the execution trace of an AI agent contains each of the
required reasoning steps, in the order given.

Required reasoning steps:
__REQUIRED_STEPS__

Execution trace:
__TRACE__

(Fallback) final output text:
__TEXT__

Reply with ONLY a JSON object of this shape:
{
  \"steps_analysis\": [
    {\"step\": \"<step description>\", \"found\": true, \"evidence\": \"<quote or explanation>\"}
  ]
}
List one entry per required step, in the same order.
";

pub(crate) const FAITHFULNESS_PROMPT: &str = "\
You are an expert fact-checker for AI assistants.
Decide whether the answer below is fully supported by the provided
context, without hallucinating or contradicting it.

Context:
__CONTEXT__

Answer:
__ANSWER__

Reply with ONLY a JSON object of this shape:
{
  \"faithful\": true,
  \"reasoning\": \"<why, citing any contradiction>\",
  \"score\": 1.0
}
Use score 1.0 when faithful and 0.0 when not.
";

pub(crate) const TONE_PROMPT: &str = "\
You are an expert tone analyzer for AI assistants.
Decide whether the response below matches the expected tone.

Expected tone:
__TONE__

Response:
__RESPONSE__

Reply with ONLY a JSON object of this shape:
{
  \"matches_tone\": true,
  \"reasoning\": \"<why, citing specific wording>\",
  \"score\": 1.0
}
Use score 1.0 when the tone matches and 0.0 when it does not.
";

/// Substitute `__NAME__` placeholders in a template.
pub(crate) fn render(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut prompt = template.to_string();
    for (name, value) in substitutions {
        prompt = prompt.replace(name, value);
    }
    prompt
}
