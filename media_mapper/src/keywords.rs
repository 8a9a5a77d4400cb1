use std::collections::HashSet;

use rf_openai::{Completer, CompletionError};

// English stopword list, one word per line.
const STOPWORDS: &str = include_str!("stopwords.txt");

const REFINE_SYSTEM_PROMPT: &str = "You are an assistant for refining \
     keyword selection for finding stock images for short form content.";

/// Derives a compact keyword list from free-text script content.
///
/// Tokenizes on non-alphanumeric boundaries, lowercases, and drops
/// stopwords. Duplicates from repeated script words are collapsed,
/// keeping first-occurrence order, since a repeated keyword would only
/// repeat the identical catalog search. Empty input yields an empty
/// list, not an error.
#[must_use]
pub fn extract_keywords(script_text: &str) -> Vec<String> {
    let stopwords: HashSet<&str> = STOPWORDS.lines().collect();

    let mut seen = HashSet::new();
    let mut keywords = Vec::new();

    for token in script_text.split(|c: char| !c.is_alphanumeric()) {
        if token.is_empty() {
            continue;
        }

        let token = token.to_lowercase();

        if stopwords.contains(token.as_str()) {
            continue;
        }

        if seen.insert(token.clone()) {
            keywords.push(token);
        }
    }

    keywords
}

/// Asks the language model for the most search-worthy keywords in the
/// script and parses the comma-separated reply.
///
/// # Errors
/// Propagates completion failures; callers fall back to
/// [`extract_keywords`] so a model outage degrades keyword quality
/// instead of aborting the run.
pub async fn refine_keywords<C: Completer>(
    completer: &C,
    script_text: &str,
    max_keywords: usize,
) -> Result<Vec<String>, CompletionError> {
    let prompt = format!(
        "The following is the script of a video: {script_text}. \
         Select the top {max_keywords} most relevant keywords from the \
         script provided for finding stock images or videos. \
         Provide them in a comma-separated list."
    );

    let reply = completer.complete(REFINE_SYSTEM_PROMPT, &prompt).await?;

    Ok(reply
        .split(',')
        .map(|word| word.trim().to_string())
        .filter(|word| !word.is_empty())
        .take(max_keywords)
        .collect())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rf_openai::{Completer, CompletionError};

    use super::{extract_keywords, refine_keywords};

    struct CannedCompleter {
        reply: String,
    }

    impl Completer for CannedCompleter {
        async fn complete(
            &self,
            _system_prompt: &str,
            _user_prompt: &str,
        ) -> Result<String, CompletionError> {
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_extract_keywords_drops_stopwords_and_punctuation() {
        let keywords = extract_keywords(
            "The quantum computer is not a toy, it is the future!",
        );

        assert_eq!(
            keywords,
            vec!["quantum", "computer", "toy", "future"]
        );
    }

    #[test]
    fn test_extract_keywords_deduplicates_in_order() {
        let keywords =
            extract_keywords("Robots build robots. Robots everywhere.");

        assert_eq!(keywords, vec!["robots", "build", "everywhere"]);
    }

    #[test]
    fn test_extract_keywords_empty_input() {
        assert_eq!(extract_keywords(""), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_refine_keywords_parses_comma_separated_reply() {
        let completer = CannedCompleter {
            reply: "artificial intelligence, healthcare , robotics,"
                .to_string(),
        };

        let keywords =
            refine_keywords(&completer, "a script", 15).await.unwrap();

        assert_eq!(
            keywords,
            vec!["artificial intelligence", "healthcare", "robotics"]
        );
    }

    #[tokio::test]
    async fn test_refine_keywords_respects_max() {
        let completer = CannedCompleter {
            reply: "one, two, three, four".to_string(),
        };

        let keywords =
            refine_keywords(&completer, "a script", 2).await.unwrap();

        assert_eq!(keywords, vec!["one", "two"]);
    }
}
