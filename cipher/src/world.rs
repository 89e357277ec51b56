//! The registry that owns every person and conversation.
//!
//! People and conversations refer to each other by id, never by ownership,
//! so the cycle conversation → participant → current conversation is
//! broken here: the world owns both sides and resolves ids on demand.

use crate::conversation::Conversation;
use crate::error::{Error, Result};
use crate::id::{ConversationId, PersonId};
use crate::memory::MemoryKind;
use crate::message::Message;
use crate::person::Person;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Arena of people and conversations, addressed by id.
#[derive(Debug, Default)]
pub struct World {
    people: HashMap<PersonId, Person>,
    conversations: HashMap<ConversationId, Conversation>,
}

impl World {
    /// Create an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a person.
    pub fn create_person(&mut self, name: impl Into<String>, age: u32) -> PersonId {
        self.add_person(Person::new(name, age))
    }

    /// Register an existing person.
    pub fn add_person(&mut self, person: Person) -> PersonId {
        let id = person.id();
        debug!(person = %person.name, %id, "person registered");
        self.people.insert(id, person);
        id
    }

    /// Create and register a conversation.
    pub fn create_conversation(&mut self, context: impl Into<String>) -> ConversationId {
        self.add_conversation(Conversation::new(context))
    }

    /// Register an existing conversation.
    pub fn add_conversation(&mut self, conversation: Conversation) -> ConversationId {
        let id = conversation.id();
        debug!(context = %conversation.context, %id, "conversation registered");
        self.conversations.insert(id, conversation);
        id
    }

    /// Look up a person.
    pub fn person(&self, id: PersonId) -> Result<&Person> {
        self.people.get(&id).ok_or(Error::PersonNotFound(id))
    }

    /// Look up a person mutably.
    pub fn person_mut(&mut self, id: PersonId) -> Result<&mut Person> {
        self.people.get_mut(&id).ok_or(Error::PersonNotFound(id))
    }

    /// Look up a conversation.
    pub fn conversation(&self, id: ConversationId) -> Result<&Conversation> {
        self.conversations
            .get(&id)
            .ok_or(Error::ConversationNotFound(id))
    }

    /// All registered people, in no particular order.
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    /// All registered conversations, in no particular order.
    pub fn conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.values()
    }

    /// Make `conversation` the person's active conversation and add them
    /// as a participant.
    ///
    /// Any previous conversation is abandoned without leaving it: the
    /// person stays listed as a participant there and keeps receiving its
    /// messages in memory.
    pub fn join_conversation(
        &mut self,
        person_id: PersonId,
        conversation_id: ConversationId,
    ) -> Result<()> {
        let conversation = self
            .conversations
            .get_mut(&conversation_id)
            .ok_or(Error::ConversationNotFound(conversation_id))?;
        let person = self
            .people
            .get_mut(&person_id)
            .ok_or(Error::PersonNotFound(person_id))?;

        if let Some(previous) = person.current_conversation() {
            if previous != conversation_id {
                debug!(person = %person.name, %previous, "abandoning previous conversation");
            }
        }

        person.set_current_conversation(Some(conversation_id));
        conversation.add_participant(person_id);
        info!(person = %person.name, context = %conversation.context, "joined conversation");
        Ok(())
    }

    /// Leave the active conversation, if any.
    ///
    /// Removes the person from its participants and clears their active
    /// conversation. Returns the conversation that was left.
    pub fn leave_conversation(&mut self, person_id: PersonId) -> Result<Option<ConversationId>> {
        let person = self
            .people
            .get_mut(&person_id)
            .ok_or(Error::PersonNotFound(person_id))?;

        let Some(conversation_id) = person.current_conversation() else {
            return Ok(None);
        };
        person.set_current_conversation(None);

        if let Some(conversation) = self.conversations.get_mut(&conversation_id) {
            conversation.remove_participant(person_id);
            info!(person = %person.name, context = %conversation.context, "left conversation");
        }
        Ok(Some(conversation_id))
    }

    /// Say something in the person's active conversation.
    ///
    /// Fails with [`Error::NotInConversation`] when the person has no
    /// active conversation; no memory is touched in that case.
    pub fn speak(&mut self, person_id: PersonId, content: impl Into<String>) -> Result<Message> {
        let person = self.person(person_id)?;
        let Some(conversation_id) = person.current_conversation() else {
            warn!(person = %person.name, "tried to speak outside a conversation");
            return Err(Error::NotInConversation {
                person: person_id,
                name: person.name.clone(),
            });
        };

        let message = Message::new(person_id, person.name.clone(), content);
        self.add_message(conversation_id, message.clone())?;
        Ok(message)
    }

    /// Append a message to a conversation and write it into the memory of
    /// every participant, the speaker included.
    ///
    /// The speaker must be a participant; otherwise
    /// [`Error::NotAParticipant`] is returned and nothing changes.
    pub fn add_message(&mut self, conversation_id: ConversationId, message: Message) -> Result<()> {
        let conversation = self
            .conversations
            .get_mut(&conversation_id)
            .ok_or(Error::ConversationNotFound(conversation_id))?;

        if !conversation.is_participant(message.speaker) {
            warn!(
                speaker = %message.speaker_name,
                context = %conversation.context,
                "message rejected: speaker is not a participant"
            );
            return Err(Error::NotAParticipant {
                person: message.speaker,
                conversation: conversation_id,
            });
        }

        let participants = conversation.participants().to_vec();
        let context = conversation.context.clone();
        let message = conversation.record(message);
        info!(
            speaker = %message.speaker_name,
            %context,
            recipients = participants.len(),
            "message added"
        );

        for participant in participants {
            match self.people.get_mut(&participant) {
                Some(person) => {
                    person.memory_mut().add_memory(
                        MemoryKind::Conversation,
                        message.content.clone(),
                        Some(message.speaker_name.clone()),
                        Some(conversation_id),
                    );
                }
                None => warn!(%participant, "participant is not registered"),
            }
        }
        Ok(())
    }

    /// Have a person listen to a message. See [`Person::listen`].
    pub fn listen(&mut self, person_id: PersonId, message: &Message) -> Result<String> {
        Ok(self.person_mut(person_id)?.listen(message))
    }

    /// Have a person think. See [`Person::think`].
    pub fn think(&mut self, person_id: PersonId, context: &str) -> Result<String> {
        Ok(self.person_mut(person_id)?.think(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_chat() -> (World, PersonId, PersonId, ConversationId) {
        let mut world = World::new();
        let alice = world.create_person("Alice", 25);
        let bob = world.create_person("Bob", 30);
        let chat = world.create_conversation("AI and consciousness");
        world.join_conversation(alice, chat).unwrap();
        world.join_conversation(bob, chat).unwrap();
        (world, alice, bob, chat)
    }

    #[test]
    fn test_join_sets_current_and_participants() {
        let (world, alice, bob, chat) = world_with_chat();

        assert_eq!(world.person(alice).unwrap().current_conversation(), Some(chat));
        assert_eq!(world.conversation(chat).unwrap().participants(), &[alice, bob]);
    }

    #[test]
    fn test_join_twice_is_idempotent() {
        let (mut world, alice, _, chat) = world_with_chat();
        world.join_conversation(alice, chat).unwrap();
        assert_eq!(world.conversation(chat).unwrap().participants().len(), 2);
    }

    #[test]
    fn test_join_replaces_without_leaving() {
        let (mut world, alice, _, chat) = world_with_chat();
        let other = world.create_conversation("gardening");

        world.join_conversation(alice, other).unwrap();

        assert_eq!(world.person(alice).unwrap().current_conversation(), Some(other));
        assert!(world.conversation(chat).unwrap().is_participant(alice));
        assert!(world.conversation(other).unwrap().is_participant(alice));
    }

    #[test]
    fn test_join_unknown_ids() {
        let mut world = World::new();
        let alice = world.create_person("Alice", 25);
        let chat = world.create_conversation("general");

        assert!(matches!(
            world.join_conversation(alice, ConversationId::new()),
            Err(Error::ConversationNotFound(_))
        ));
        assert!(matches!(
            world.join_conversation(PersonId::new(), chat),
            Err(Error::PersonNotFound(_))
        ));
        assert!(world.person(alice).unwrap().current_conversation().is_none());
    }

    #[test]
    fn test_speak_fans_out_to_all_participants() {
        let (mut world, alice, bob, chat) = world_with_chat();

        let message = world.speak(alice, "Hello Bob").unwrap();

        assert_eq!(message.speaker, alice);
        assert_eq!(world.conversation(chat).unwrap().message_history().len(), 1);
        for id in [alice, bob] {
            let memory = world.person(id).unwrap().memory();
            assert_eq!(memory.len(), 1);
            let entry = memory.last().unwrap();
            assert_eq!(entry.kind, MemoryKind::Conversation);
            assert_eq!(entry.content, "Hello Bob");
            assert_eq!(entry.source.as_deref(), Some("Alice"));
            assert_eq!(entry.conversation_id, Some(chat));
        }
    }

    #[test]
    fn test_speak_without_conversation() {
        let mut world = World::new();
        let carol = world.create_person("Carol", 41);

        let err = world.speak(carol, "Anyone there?").unwrap_err();

        assert!(matches!(err, Error::NotInConversation { person, .. } if person == carol));
        assert!(world.person(carol).unwrap().memory().is_empty());
    }

    #[test]
    fn test_add_message_rejects_outsiders() {
        let (mut world, alice, bob, chat) = world_with_chat();
        let mallory = world.create_person("Mallory", 33);

        let intruding = Message::new(mallory, "Mallory", "Let me in");
        let err = world.add_message(chat, intruding).unwrap_err();

        assert!(matches!(err, Error::NotAParticipant { .. }));
        assert!(world.conversation(chat).unwrap().message_history().is_empty());
        assert!(world.person(alice).unwrap().memory().is_empty());
        assert!(world.person(bob).unwrap().memory().is_empty());
    }

    #[test]
    fn test_leave_conversation() {
        let (mut world, alice, bob, chat) = world_with_chat();

        assert_eq!(world.leave_conversation(alice).unwrap(), Some(chat));
        assert_eq!(world.leave_conversation(alice).unwrap(), None);
        assert!(world.person(alice).unwrap().current_conversation().is_none());
        assert_eq!(world.conversation(chat).unwrap().participants(), &[bob]);

        world.speak(bob, "Alone now").unwrap();
        assert!(world.person(alice).unwrap().memory().is_empty());
        assert!(matches!(
            world.speak(alice, "wait"),
            Err(Error::NotInConversation { .. })
        ));
    }

    #[test]
    fn test_abandoned_conversation_still_delivers() {
        let (mut world, alice, bob, chat) = world_with_chat();
        let other = world.create_conversation("gardening");
        world.join_conversation(alice, other).unwrap();

        world.speak(bob, "Still here?").unwrap();

        let entry = world.person(alice).unwrap().memory().last().unwrap().clone();
        assert_eq!(entry.conversation_id, Some(chat));
    }
}
