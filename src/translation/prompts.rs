/*!
 * Prompt templates for the three translation stages.
 *
 * The chunk under translation is always delimited by the
 * [`TRANSLATE_OPEN`]/[`TRANSLATE_CLOSE`] markers; the reflect and revise
 * stages additionally receive a window of neighbouring source chunks as
 * disambiguating context.
 */

/// Opening marker around the chunk currently being translated.
pub const TRANSLATE_OPEN: &str = "<TRANSLATE_THIS>";

/// Closing marker around the chunk currently being translated.
pub const TRANSLATE_CLOSE: &str = "</TRANSLATE_THIS>";

/// Draft-stage template. The prompt carries only the chunk itself.
const DRAFT_TEMPLATE: &str = r#"Your task is to provide a professional translation from {source_language} to {target_language} of PART of a text.

To reiterate, you should translate only this part and ALL of it, shown here between <TRANSLATE_THIS> and </TRANSLATE_THIS>:
<TRANSLATE_THIS>
{chunk}
</TRANSLATE_THIS>

Guidelines for the translation:
1. Translate ALL content between <TRANSLATE_THIS> and </TRANSLATE_THIS>.
2. Maintain paragraph structure and line breaks.
3. Preserve all markdown, image links, LaTeX code, and titles.
4. Do not drop any single line from the delimited part.
5. Even a lone title, or a title with an incomplete paragraph, still needs to be translated.

Output only the translation of the portion you are asked to translate, and nothing else."#;

/// Reflect-stage template. Receives the tagged context window, the chunk,
/// and the draft translation, and asks for concrete suggestions.
const REFLECT_TEMPLATE: &str = r#"Your task is to carefully read a source text and part of a translation of that text from {source_language} to {target_language}, and then give constructive criticism and helpful suggestions for improving the translation.
The final style and tone of the translation should match the style of {target_language} colloquially spoken in {country}.

The source text is below, delimited by XML tags <SOURCE_TEXT> and </SOURCE_TEXT>, and the part that has been translated is delimited by <TRANSLATE_THIS> and </TRANSLATE_THIS> within the source text. You can use the rest of the source text as context for critiquing the translated part. Keep all markdown image links, LaTeX code, and multi-level titles in their positions and relationships within the text.

<SOURCE_TEXT>
{tagged_text}
</SOURCE_TEXT>

To reiterate, only part of the text is being translated, shown here again between <TRANSLATE_THIS> and </TRANSLATE_THIS>:
<TRANSLATE_THIS>
{chunk}
</TRANSLATE_THIS>

The translation of the indicated part, delimited below by <TRANSLATION> and </TRANSLATION>, is as follows:
<TRANSLATION>
{draft}
</TRANSLATION>

When writing suggestions, pay attention to whether there are ways to improve the translation's:
(i) accuracy (by correcting errors of addition, mistranslation, omission, or untranslated text),
(ii) fluency (by applying {target_language} grammar, spelling and punctuation rules, and ensuring there are no unnecessary repetitions),
(iii) style (by ensuring the translation reflects the style of the source text and takes into account any cultural context),
(iv) terminology (by ensuring terminology use is consistent, reflects the source text domain, and uses equivalent {target_language} idioms).

Write a list of specific, helpful and constructive suggestions for improving the translation.
Each suggestion should address one specific part of the translation.
Output only the suggestions and nothing else."#;

/// Revise-stage template. Adds the reflect-stage critique to the reflect
/// inputs and asks for the improved translation.
const REVISE_TEMPLATE: &str = r#"Your task is to carefully read, then improve, a translation from {source_language} to {target_language}, taking into account a set of expert suggestions and constructive criticisms. Below, the source text, initial translation, and expert suggestions are provided.

The source text is below, delimited by XML tags <SOURCE_TEXT> and </SOURCE_TEXT>, and the part that has been translated is delimited by <TRANSLATE_THIS> and </TRANSLATE_THIS> within the source text. You can use the rest of the source text as context, but need to provide a translation only of the part indicated by <TRANSLATE_THIS> and </TRANSLATE_THIS>.

<SOURCE_TEXT>
{tagged_text}
</SOURCE_TEXT>

To reiterate, only part of the text is being translated, shown here again between <TRANSLATE_THIS> and </TRANSLATE_THIS>:
<TRANSLATE_THIS>
{chunk}
</TRANSLATE_THIS>

The translation of the indicated part, delimited below by <TRANSLATION> and </TRANSLATION>, is as follows:
<TRANSLATION>
{draft}
</TRANSLATION>

The expert suggestions for the indicated part, delimited below by <EXPERT_SUGGESTIONS> and </EXPERT_SUGGESTIONS>, are as follows:
<EXPERT_SUGGESTIONS>
{reflection}
</EXPERT_SUGGESTIONS>

Taking the expert suggestions into account, rewrite the translation to improve it, paying attention to:
1. accuracy (by correcting errors of addition, mistranslation, omission, or untranslated text),
2. fluency (by applying {target_language} grammar, spelling and punctuation rules and ensuring there are no unnecessary repetitions),
3. style (by ensuring the translation reflects the style of the source text),
4. terminology (inappropriate for context, inconsistent use),
5. do not drop any single line from the delimited part, even a lone image link,
6. do not translate anything outside the <TRANSLATE_THIS> part of <SOURCE_TEXT>,
7. even a lone title, or a title with an incomplete paragraph, still needs to be translated,
8. preserve all markdown, image links, LaTeX code, paragraph structure, and titles.

Output only the new translation of the indicated part and nothing else."#;

/// Language/locale context rendered into every stage prompt.
///
/// Languages are full English names (resolved from ISO codes at startup);
/// `country` guides the colloquial style of the target text.
#[derive(Debug, Clone)]
pub struct PromptContext {
    /// Source language name, e.g. "English"
    pub source_language: String,
    /// Target language name, e.g. "Chinese"
    pub target_language: String,
    /// Target locale for stylistic guidance, e.g. "China"
    pub country: String,
}

impl PromptContext {
    /// Create a prompt context.
    pub fn new(
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            source_language: source_language.into(),
            target_language: target_language.into(),
            country: country.into(),
        }
    }

    fn render_languages(&self, template: &str) -> String {
        template
            .replace("{source_language}", &self.source_language)
            .replace("{target_language}", &self.target_language)
            .replace("{country}", &self.country)
    }

    /// Build the draft-stage prompt for one chunk.
    pub fn draft_prompt(&self, chunk: &str) -> String {
        self.render_languages(DRAFT_TEMPLATE).replace("{chunk}", chunk)
    }

    /// Build the reflect-stage prompt for one chunk.
    pub fn reflect_prompt(&self, tagged_text: &str, chunk: &str, draft: &str) -> String {
        self.render_languages(REFLECT_TEMPLATE)
            .replace("{tagged_text}", tagged_text)
            .replace("{chunk}", chunk)
            .replace("{draft}", draft)
    }

    /// Build the revise-stage prompt for one chunk.
    pub fn revise_prompt(
        &self,
        tagged_text: &str,
        chunk: &str,
        draft: &str,
        reflection: &str,
    ) -> String {
        self.render_languages(REVISE_TEMPLATE)
            .replace("{tagged_text}", tagged_text)
            .replace("{chunk}", chunk)
            .replace("{draft}", draft)
            .replace("{reflection}", reflection)
    }
}
