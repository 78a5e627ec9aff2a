//! Deterministic template text used when no upstream model is configured.
//!
//! Every content type has a fixed section layout. `length` only decides
//! which optional sections appear and `tone` only swaps phrasing inside a
//! section, so the same inputs always produce the same text. The prompt is
//! interpolated verbatim; the output is plain text and callers render it as
//! such.

use crate::types::{GenerationRequest, Length};

pub fn generate_for(request: &GenerationRequest) -> String {
    generate(
        request.content_type.as_str(),
        &request.prompt,
        &request.tone,
        request.length,
    )
}

/// Builds the template text for a raw content-type tag. Unrecognized tags get
/// a one-line sentence instead of an error.
pub fn generate(content_type: &str, prompt: &str, tone: &str, length: Length) -> String {
    let topic = Topic::new(prompt);
    let sections = match content_type {
        "blog" => blog(&topic, length),
        "social" => social(&topic, tone, length),
        "email" => email(&topic, length),
        "product" => product(&topic, length),
        _ => vec![format!("High-quality insights regarding {}.", topic.text)],
    };
    sections.join("\n\n").trim().to_string()
}

struct Topic<'a> {
    text: &'a str,
    heading: String,
}

impl<'a> Topic<'a> {
    fn new(prompt: &'a str) -> Self {
        let text = prompt.trim();
        Self {
            text,
            heading: capitalize_first(text),
        }
    }

    fn hashtag(&self) -> String {
        self.text.split_whitespace().collect()
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn blog(topic: &Topic, length: Length) -> Vec<String> {
    let Topic { text: p, heading } = topic;
    let mut sections = vec![
        format!("# The Comprehensive Guide to {heading}"),
        format!(
            "In today's rapidly changing landscape, {p} has emerged as an essential topic for \
             professionals and enthusiasts alike. Whether you're looking to optimize your workflow \
             or simply stay ahead of the curve, understanding the core principles of {p} is the \
             first step toward significant growth."
        ),
    ];

    if length != Length::Short {
        sections.push(format!("## Why {heading} Matters Now"));
        sections.push(format!(
            "The transition toward more efficient systems has made {p} a top priority. Industry \
             leaders are increasingly turning to these strategies to solve complex problems, citing \
             improved efficiency and better overall outcomes as primary drivers."
        ));
        sections.push("### Key Strategies for Success".to_string());
        sections.push(format!(
            "1. **Foundational Knowledge**: Before diving deep, ensure you have a solid grasp of the basics.\n\
             2. **Consistent Practice**: Like any skill, mastering {p} requires dedication and regular application.\n\
             3. **Continuous Learning**: The field is always evolving, so staying curious is vital."
        ));
    }

    sections.push("## Future Outlook".to_string());
    let outlook = if length == Length::Long {
        "By staying proactive and embracing these changes, you can position yourself at the \
         forefront of innovation. The potential for measurable results is vast, provided one \
         remains committed to the principles outlined here."
    } else {
        "It represents a significant shift in how we approach our daily challenges."
    };
    sections.push(format!(
        "As we look ahead, the impact of {p} is only expected to increase. {outlook}"
    ));
    sections.push(format!(
        "Conclusion: Embracing {p} isn't just a choice; it's a strategic move for the modern era."
    ));
    sections
}

fn social(topic: &Topic, tone: &str, length: Length) -> Vec<String> {
    let Topic { text: p, heading } = topic;
    let hook = if tone == "humorous" {
        format!("I used to think {p} was a myth, but here we are! 😂")
    } else {
        format!("We've been seeing a massive shift in how {p} is being utilized.")
    };
    let mut sections = vec![format!("✨ Unleashing the Power of {heading}! ✨"), hook];

    if length != Length::Short {
        sections.push(format!(
            "It's not just about the theory; it's about the real-world impact. Whether you're a \
             beginner or a pro, there's always something new to discover about {p}."
        ));
        sections.push(
            "🔥 Key Takeaways:\n\
             - Efficiency is key ⚡\n\
             - Stay ahead of the trend 📈\n\
             - Build for the future 🚀"
                .to_string(),
        );
    }
    if length == Length::Long {
        sections.push(format!(
            "The conversation around {p} is only getting started, and the people who engage \
             early are the ones who get to shape where it goes next."
        ));
    }

    sections.push(format!("What are your thoughts on {p}? Let's discuss below! 👇"));
    sections.push(format!(
        "#{} #Innovation #FutureTech #AIContent #GrowthMindset",
        topic.hashtag()
    ));
    sections
}

fn email(topic: &Topic, length: Length) -> Vec<String> {
    let Topic { text: p, heading } = topic;
    let mut sections = vec![
        format!("Subject: Maximizing Your Results with {heading}"),
        "Hi there,".to_string(),
        format!(
            "I hope you're having a productive week. I'm reaching out because I've been doing some \
             deep research into {p} and I believe there are some incredible insights that could \
             directly benefit your current projects."
        ),
    ];

    if length != Length::Short {
        sections.push(format!(
            "Over the past few months, the data surrounding {p} has shown a consistent trend toward \
             higher efficiency and better resource management. I've put together a few thoughts on \
             how we might integrate these findings:"
        ));
        sections.push(format!(
            "- **Phase 1**: Initial audit of existing {p} workflows.\n\
             - **Phase 2**: Implementation of new, optimized protocols.\n\
             - **Phase 3**: Measuring results and iterating for perfection."
        ));
    }

    sections.push(if length == Length::Long {
        "I'd love to jump on a brief call next Tuesday to walk you through the specifics. I've \
         prepared a detailed report that highlights the potential ROI and long-term advantages of \
         this approach."
            .to_string()
    } else {
        "Let me know if you're interested in seeing the full breakdown.".to_string()
    });
    sections.push("Best regards,".to_string());
    sections.push("[Your Name]\nAI Content Strategist".to_string());
    sections
}

fn product(topic: &Topic, length: Length) -> Vec<String> {
    let Topic { text: p, heading } = topic;
    let mut sections = vec![
        format!("## Introducing the All-New {heading} Solution"),
        format!(
            "Experience the next generation of performance with our {p} toolkit. Designed from the \
             ground up for professionals who demand excellence, this solution combines \
             cutting-edge technology with intuitive design."
        ),
        format!(
            "**Key Features:**\n\
             - **Dynamic Performance**: Tailored handles for {p} scenarios.\n\
             - **Intuitive Interface**: Spend less time configuring and more time doing.\n\
             - **Robust Integration**: Works seamlessly with your existing stack."
        ),
    ];

    if length != Length::Short {
        sections.push(format!("### Why Choose Our {p} Solution?"));
        sections.push(format!(
            "Unlike traditional methods, our approach to {p} focuses on the specific needs of \
             modern teams. We've eliminated the friction points that usually slow you down, \
             allowing for a 2x increase in output without sacrificing quality."
        ));
    }
    if length == Length::Long {
        sections.push(format!(
            "Our commitment to {p} excellence is backed by years of research and development. \
             We've spoken to hundreds of industry experts to ensure that every feature we ship \
             solves a real problem. From the initial setup to daily operations, you'll feel the \
             difference of a tool built by experts, for experts."
        ));
    }

    sections.push("Elevate your game today.".to_string());
    sections
}
