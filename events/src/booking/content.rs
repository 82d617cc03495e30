//! Canned agenda outlines offered at the end of the booking conversation.

/// Which outline an event name selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outline {
    /// Names mentioning "deep learning" or "ai"
    DeepLearning,
    /// Names mentioning "machine learning" or "ml"
    MachineLearning,
    /// Everything else
    General,
}

impl Outline {
    /// Pick the outline by case-insensitive substring match on the name.
    ///
    /// The checks are plain substring tests, so "Chair Yoga" selects
    /// [`Outline::DeepLearning`] and "HTML Basics" selects
    /// [`Outline::MachineLearning`].
    #[must_use]
    pub fn for_event(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("deep learning") || name.contains("ai") {
            Self::DeepLearning
        } else if name.contains("machine learning") || name.contains("ml") {
            Self::MachineLearning
        } else {
            Self::General
        }
    }
}

const DEEP_LEARNING: &str = "1. Introduction to Deep Learning (15 min)
What is Deep Learning?
Difference between ML, DL, and AI
Applications (Computer Vision, NLP, Generative AI)

2. Key Architectures & Models (20 min)
CNNs (Convolutional Neural Networks) – Image processing
RNNs, LSTMs, Transformers – Sequential data & NLP
GANs, Diffusion Models – Generative AI & Image Synthesis

3. Hands-on Demo (30-45 min)
Image Classification with CNNs (e.g., TensorFlow/Keras)
Text Generation with Transformers (e.g., OpenAI's GPT)
Fine-tuning a Pre-trained Model (e.g., Hugging Face)

4. Real-World Use Cases (20 min)
Deep Learning in Industry (Finance, Healthcare, Autonomous Driving)
Challenges: Data Bias, Interpretability, Compute Cost

5. Networking & Q&A (15-30 min)
Discuss career paths in Deep Learning
Open discussion on industry trends & challenges";

const MACHINE_LEARNING: &str = "1. Introduction to Machine Learning (15 min)
Overview of ML concepts and types
Supervised vs. Unsupervised Learning
Common applications

2. ML Algorithms Overview (20 min)
Classification algorithms (Decision Trees, SVM, etc.)
Regression techniques
Clustering and dimensionality reduction

3. Practical Workshop (30 min)
Building a simple ML model with scikit-learn
Data preprocessing techniques
Model evaluation and validation

4. Advanced Topics & Discussion (20 min)
Ensemble methods
Feature engineering best practices
Ethical considerations in ML

5. Q&A and Networking (15 min)
Career opportunities in ML
Resources for further learning";

fn general(name: &str) -> String {
    format!(
        "1. Introduction and Overview (15 min)
Welcome and introduction to the topic
Key concepts and terminology
Relevance to UW community

2. Main Presentation (30 min)
Core content related to \"{name}\"
Recent developments and research
Real-world applications

3. Interactive Session (20 min)
Hands-on activities
Group discussions
Q&A opportunities

4. Next Steps (15 min)
Resources for further learning
Future events and connections
Practical applications

5. Networking (20 min)
Meet fellow attendees
Connect with speakers and experts
Refreshments and informal discussions"
    )
}

/// Suggested agenda for an event, headed by the event name.
#[must_use]
pub fn suggest_content(event_name: &str) -> String {
    let body = match Outline::for_event(event_name) {
        Outline::DeepLearning => DEEP_LEARNING.to_string(),
        Outline::MachineLearning => MACHINE_LEARNING.to_string(),
        Outline::General => general(event_name),
    };
    format!("Suggested content for {event_name}:\n\n{body}")
}
